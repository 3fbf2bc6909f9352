//! # Profile Module
//!
//! Named mapping profiles persisted as JSON.
//!
//! This module handles:
//! - Loading and saving the profile store
//! - Selecting, creating, renaming, removing and resetting profiles
//! - Editing a profile's bindings by [`MappingKey`]
//! - Producing the immutable [`EngineConfig`] snapshot for the engine
//!
//! ## File Format
//!
//! ```json
//! {
//!   "selectedProfile": "Default configuration profile",
//!   "profiles": [
//!     {
//!       "name": "Default configuration profile",
//!       "leftStick": {"mode": "mouseAxis", "speed": 15.0, "movePointer": true},
//!       "rightStick": {"mode": "none", "speed": 15.0, "movePointer": true},
//!       "swapFaceButtons": false,
//!       "mappings": {
//!         "Buttons|A": {"type": "key", "code": 57, "name": "Space"}
//!       }
//!     }
//!   ]
//! }
//! ```
//!
//! Mapping keys that no longer decode are kept in the file but ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{MapperError, Result};
use crate::mapping::{Action, EngineConfig, MappingKey, MappingTable, StickConfig, MAX_STICK_SPEED};

/// Name of the profile created when nothing else exists.
pub const DEFAULT_PROFILE_NAME: &str = "Default configuration profile";

/// One named set of bindings and stick settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamepadProfile {
    pub name: String,

    #[serde(default)]
    pub left_stick: StickConfig,

    #[serde(default)]
    pub right_stick: StickConfig,

    #[serde(default)]
    pub swap_face_buttons: bool,

    /// Encoded `"<Section>|<Label>"` key to action.
    #[serde(default)]
    pub mappings: BTreeMap<String, Action>,
}

impl Default for GamepadProfile {
    fn default() -> Self {
        Self::new(DEFAULT_PROFILE_NAME)
    }
}

impl GamepadProfile {
    /// Empty profile: no bindings, both sticks idle, no swap.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            left_stick: StickConfig::default(),
            right_stick: StickConfig::default(),
            swap_face_buttons: false,
            mappings: BTreeMap::new(),
        }
    }

    /// Decoded bindings. Keys that do not decode are skipped.
    #[must_use]
    pub fn mapping_table(&self) -> MappingTable {
        self.mappings
            .iter()
            .filter_map(|(encoded, action)| match MappingKey::decode(encoded) {
                Some(key) => Some((key, action.clone())),
                None => {
                    debug!("Skipping stale mapping key \"{}\" in {}", encoded, self.name);
                    None
                }
            })
            .collect()
    }

    /// Binds `key` to `action`, replacing any previous binding.
    pub fn set_mapping(&mut self, key: &MappingKey, action: Action) {
        self.mappings.insert(key.encode(), action);
    }

    /// Removes the binding for `key`, returning it.
    pub fn clear_mapping(&mut self, key: &MappingKey) -> Option<Action> {
        self.mappings.remove(&key.encode())
    }

    /// Display name of the action bound to `key`, or an empty string.
    #[must_use]
    pub fn mapping_text(&self, key: &MappingKey) -> &str {
        self.mappings
            .get(&key.encode())
            .map_or("", |action| action.name.as_str())
    }

    /// Immutable snapshot for one engine instance.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            mappings: self.mapping_table(),
            left_stick: self.left_stick,
            right_stick: self.right_stick,
            swap_face_buttons: self.swap_face_buttons,
        }
    }

    /// Validate stick settings
    ///
    /// # Errors
    ///
    /// Returns `InvalidProfile` if a stick speed is outside `(0, 30]`.
    pub fn validate(&self) -> Result<()> {
        for (stick, config) in [("left", &self.left_stick), ("right", &self.right_stick)] {
            // Written as a negated range check so NaN is rejected too
            if !(config.speed > 0.0 && config.speed <= MAX_STICK_SPEED) {
                return Err(MapperError::InvalidProfile(format!(
                    "{}: {} stick speed must be greater than 0 and at most {}, got {}",
                    self.name, stick, MAX_STICK_SPEED, config.speed
                )));
            }
        }
        Ok(())
    }

    /// Restores bindings and stick settings to their defaults. Keeps the name.
    pub fn reset(&mut self) {
        *self = Self::new(std::mem::take(&mut self.name));
    }
}

/// All profiles plus the current selection.
///
/// Never empty once loaded or constructed through [`ProfileStore::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStore {
    #[serde(default)]
    pub selected_profile: String,

    #[serde(default)]
    pub profiles: Vec<GamepadProfile>,
}

impl Default for ProfileStore {
    fn default() -> Self {
        let profile = GamepadProfile::default();
        Self {
            selected_profile: profile.name.clone(),
            profiles: vec![profile],
        }
    }
}

impl ProfileStore {
    /// Load the store from a JSON file
    ///
    /// A missing file yields a store with one default profile. A file with
    /// no profiles gets the default profile added.
    ///
    /// # Errors
    ///
    /// - `Io`: the file exists but cannot be read
    /// - `Profile`: the file is not a valid profile store
    /// - `InvalidProfile`: a profile fails [`GamepadProfile::validate`]
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gamepad_mapper::profile::ProfileStore;
    ///
    /// let store = ProfileStore::load("config/profiles.json")?;
    /// let config = store.selected().engine_config();
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No profile store at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let mut store: ProfileStore = serde_json::from_str(&contents)?;
        if store.profiles.is_empty() {
            store.profiles.push(GamepadProfile::default());
        }
        for profile in &store.profiles {
            profile.validate()?;
        }
        debug!(
            "Loaded {} profile(s) from {}",
            store.profiles.len(),
            path.display()
        );
        Ok(store)
    }

    /// Write the store as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        debug!("Saved profile store to {}", path.as_ref().display());
        Ok(())
    }

    /// The selected profile, or the first one if the selection is unknown.
    ///
    /// # Panics
    ///
    /// Panics if the store has no profiles, which `load` and `default`
    /// never produce.
    #[must_use]
    pub fn selected(&self) -> &GamepadProfile {
        let index = self.selected_index();
        &self.profiles[index]
    }

    /// Mutable access to the selected profile.
    pub fn selected_mut(&mut self) -> &mut GamepadProfile {
        let index = self.selected_index();
        &mut self.profiles[index]
    }

    /// Selects the profile called `name`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidProfile` if no profile has that name.
    pub fn select(&mut self, name: &str) -> Result<()> {
        if !self.contains(name) {
            return Err(MapperError::InvalidProfile(format!(
                "no profile named \"{}\"",
                name
            )));
        }
        self.selected_profile = name.to_string();
        Ok(())
    }

    /// Name offered for the next new profile, e.g. `"Profile 2"`.
    #[must_use]
    pub fn next_profile_name(&self) -> String {
        let mut n = self.profiles.len() + 1;
        loop {
            let name = format!("Profile {}", n);
            if !self.contains(&name) {
                return name;
            }
            n += 1;
        }
    }

    /// Adds an empty profile and selects it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidProfile` if the name is empty or taken.
    pub fn create_profile(&mut self, name: &str) -> Result<&mut GamepadProfile> {
        self.check_new_name(name)?;
        self.profiles.push(GamepadProfile::new(name));
        self.selected_profile = name.to_string();
        info!("Created profile \"{}\"", name);
        let index = self.profiles.len() - 1;
        Ok(&mut self.profiles[index])
    }

    /// Renames the selected profile and keeps it selected.
    ///
    /// # Errors
    ///
    /// Returns `InvalidProfile` if the name is empty or taken.
    pub fn rename_selected(&mut self, name: &str) -> Result<()> {
        if self.selected().name == name {
            return Ok(());
        }
        self.check_new_name(name)?;
        self.selected_mut().name = name.to_string();
        self.selected_profile = name.to_string();
        Ok(())
    }

    /// Removes the selected profile and selects the first remaining one.
    ///
    /// Removing the last profile replaces it with a default profile.
    pub fn remove_selected(&mut self) -> GamepadProfile {
        let index = self.selected_index();
        let removed = self.profiles.remove(index);
        if self.profiles.is_empty() {
            self.profiles.push(GamepadProfile::default());
        }
        self.selected_profile = self.profiles[0].name.clone();
        info!("Removed profile \"{}\"", removed.name);
        removed
    }

    /// Resets the selected profile's bindings and stick settings.
    pub fn reset_selected(&mut self) {
        self.selected_mut().reset();
    }

    fn contains(&self, name: &str) -> bool {
        self.profiles.iter().any(|profile| profile.name == name)
    }

    fn check_new_name(&self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(MapperError::InvalidProfile(
                "profile name cannot be empty".to_string(),
            ));
        }
        if self.contains(name) {
            return Err(MapperError::InvalidProfile(format!(
                "a profile named \"{}\" already exists",
                name
            )));
        }
        Ok(())
    }

    fn selected_index(&self) -> usize {
        self.profiles
            .iter()
            .position(|profile| profile.name == self.selected_profile)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{Section, StickMode};
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn key(section: Section, label: &str) -> MappingKey {
        MappingKey::new(section, label)
    }

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    fn store_with_left_speed(speed: &str) -> String {
        format!(
            r#"{{"selectedProfile":"P","profiles":[{{"name":"P","leftStick":{{"mode":"mouseAxis","speed":{}}}}}]}}"#,
            speed
        )
    }

    #[test]
    fn test_load_missing_file_gives_default_store() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::load(dir.path().join("profiles.json")).unwrap();

        assert_eq!(store.profiles.len(), 1);
        assert_eq!(store.selected().name, DEFAULT_PROFILE_NAME);
        assert!(store.selected().mappings.is_empty());
    }

    #[test]
    fn test_load_malformed_json_fails() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"{ not json").unwrap();
        temp_file.flush().unwrap();

        assert!(matches!(
            ProfileStore::load(temp_file.path()),
            Err(MapperError::Profile(_))
        ));
    }

    #[test]
    fn test_load_empty_profile_list_gets_default() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(br#"{"selectedProfile":"Gone","profiles":[]}"#)
            .unwrap();
        temp_file.flush().unwrap();

        let store = ProfileStore::load(temp_file.path()).unwrap();
        assert_eq!(store.selected().name, DEFAULT_PROFILE_NAME);
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_default_profile_is_valid() {
        assert!(GamepadProfile::default().validate().is_ok());
    }

    #[test]
    fn test_speed_negative() {
        let mut profile = GamepadProfile::new("Test");
        profile.left_stick = StickConfig::mouse(-500.0, true);
        assert!(matches!(profile.validate(), Err(MapperError::InvalidProfile(_))));
    }

    #[test]
    fn test_speed_zero() {
        let mut profile = GamepadProfile::new("Test");
        profile.right_stick = StickConfig::mouse(0.0, true);
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_speed_too_high() {
        let mut profile = GamepadProfile::new("Test");
        profile.left_stick = StickConfig::mouse(30.5, true);
        assert!(profile.validate().is_err());

        profile.left_stick = StickConfig::mouse(MAX_STICK_SPEED, true);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_speed_nan() {
        let mut profile = GamepadProfile::new("Test");
        profile.left_stick = StickConfig::mouse(f64::NAN, true);
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_load_rejects_out_of_range_speed() {
        for speed in ["-500.0", "0.0", "31.0"] {
            let temp_file = write_temp(&store_with_left_speed(speed));
            assert!(
                matches!(ProfileStore::load(temp_file.path()), Err(MapperError::InvalidProfile(_))),
                "speed {} should be rejected",
                speed
            );
        }

        let temp_file = write_temp(&store_with_left_speed("10.0"));
        let store = ProfileStore::load(temp_file.path()).unwrap();
        assert_eq!(store.selected().left_stick, StickConfig::mouse(10.0, true));
    }

    #[test]
    fn test_load_normalizes_scroll_direction() {
        let temp_file = write_temp(
            r#"{"selectedProfile":"P","profiles":[{"name":"P","mappings":{
                "Buttons|A":{"type":"scroll","direction":5,"name":"Scroll Up"},
                "Buttons|B":{"type":"scroll","direction":-2,"name":"Scroll Down"}}}]}"#,
        );

        let config = ProfileStore::load(temp_file.path()).unwrap().selected().engine_config();
        assert_eq!(
            config.mappings.get(&key(Section::Buttons, "A")),
            Some(&Action::scroll(1, "Scroll Up"))
        );
        assert_eq!(
            config.mappings.get(&key(Section::Buttons, "B")),
            Some(&Action::scroll(-1, "Scroll Down"))
        );
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.json");

        let mut store = ProfileStore::default();
        let profile = store.create_profile("Racing").unwrap();
        profile.swap_face_buttons = true;
        profile.left_stick = StickConfig::mouse(20.0, false);
        profile.set_mapping(&key(Section::Buttons, "A"), Action::key(57, "Space"));
        store.save(&path).unwrap();

        let loaded = ProfileStore::load(&path).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.selected().name, "Racing");
    }

    #[test]
    fn test_saved_json_shape() {
        let mut store = ProfileStore::default();
        store
            .selected_mut()
            .set_mapping(&key(Section::DPad, "Up"), Action::key(103, "Up"));

        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json["selectedProfile"], DEFAULT_PROFILE_NAME);
        let profile = &json["profiles"][0];
        assert_eq!(profile["swapFaceButtons"], false);
        assert_eq!(profile["leftStick"]["mode"], "none");
        assert_eq!(profile["mappings"]["DPad|Up"]["type"], "key");
    }

    #[test]
    fn test_mapping_table_skips_stale_keys() {
        let mut profile = GamepadProfile::new("Test");
        profile
            .mappings
            .insert("Buttons|A".to_string(), Action::key(57, "Space"));
        profile
            .mappings
            .insert("Triggers|L2".to_string(), Action::key(1, "Escape"));
        profile
            .mappings
            .insert("garbage".to_string(), Action::key(2, "1"));

        let table = profile.mapping_table();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(&key(Section::Buttons, "A")),
            Some(&Action::key(57, "Space"))
        );
    }

    #[test]
    fn test_set_clear_and_text() {
        let mut profile = GamepadProfile::new("Test");
        let up = key(Section::LeftStick, "Up");

        assert_eq!(profile.mapping_text(&up), "");
        profile.set_mapping(&up, Action::key(17, "W"));
        assert_eq!(profile.mapping_text(&up), "W");
        profile.set_mapping(&up, Action::scroll(1, "Scroll Up"));
        assert_eq!(profile.mapping_text(&up), "Scroll Up");

        assert_eq!(profile.clear_mapping(&up), Some(Action::scroll(1, "Scroll Up")));
        assert_eq!(profile.mapping_text(&up), "");
        assert_eq!(profile.clear_mapping(&up), None);
    }

    #[test]
    fn test_engine_config_snapshot() {
        let mut profile = GamepadProfile::new("Test");
        profile.swap_face_buttons = true;
        profile.right_stick = StickConfig::direction_pad();
        profile.set_mapping(&key(Section::RightStick, "Down"), Action::key(31, "S"));

        let config = profile.engine_config();
        assert!(config.swap_face_buttons);
        assert_eq!(config.right_stick.mode, StickMode::DirectionPad);
        assert_eq!(config.left_stick.mode, StickMode::None);
        assert_eq!(config.mappings.len(), 1);

        // Later edits do not reach an existing snapshot
        profile.clear_mapping(&key(Section::RightStick, "Down"));
        assert_eq!(config.mappings.len(), 1);
    }

    #[test]
    fn test_selected_falls_back_to_first() {
        let mut store = ProfileStore::default();
        store.selected_profile = "Unknown".to_string();
        assert_eq!(store.selected().name, DEFAULT_PROFILE_NAME);
    }

    #[test]
    fn test_select() {
        let mut store = ProfileStore::default();
        store.create_profile("Second").unwrap();

        store.select(DEFAULT_PROFILE_NAME).unwrap();
        assert_eq!(store.selected().name, DEFAULT_PROFILE_NAME);
        assert!(matches!(store.select("Third"), Err(MapperError::InvalidProfile(_))));
        assert_eq!(store.selected().name, DEFAULT_PROFILE_NAME);
    }

    #[test]
    fn test_create_profile_rejects_bad_names() {
        let mut store = ProfileStore::default();
        assert!(store.create_profile("").is_err());
        assert!(store.create_profile("   ").is_err());
        assert!(store.create_profile(DEFAULT_PROFILE_NAME).is_err());
        assert_eq!(store.profiles.len(), 1);
    }

    #[test]
    fn test_next_profile_name() {
        let mut store = ProfileStore::default();
        assert_eq!(store.next_profile_name(), "Profile 2");

        store.create_profile("Profile 3").unwrap();
        // "Profile 3" is taken
        assert_eq!(store.next_profile_name(), "Profile 4");
    }

    #[test]
    fn test_rename_selected() {
        let mut store = ProfileStore::default();
        store.create_profile("Old").unwrap();

        store.rename_selected("New").unwrap();
        assert_eq!(store.selected().name, "New");
        assert_eq!(store.selected_profile, "New");

        assert!(store.rename_selected(DEFAULT_PROFILE_NAME).is_err());
        assert!(store.rename_selected("New").is_ok());
    }

    #[test]
    fn test_remove_selected_picks_first() {
        let mut store = ProfileStore::default();
        store.create_profile("Second").unwrap();

        let removed = store.remove_selected();
        assert_eq!(removed.name, "Second");
        assert_eq!(store.selected().name, DEFAULT_PROFILE_NAME);
    }

    #[test]
    fn test_remove_last_profile_recreates_default() {
        let mut store = ProfileStore::default();
        store.rename_selected("Only").unwrap();

        store.remove_selected();

        assert_eq!(store.profiles.len(), 1);
        assert_eq!(store.selected().name, DEFAULT_PROFILE_NAME);
    }

    #[test]
    fn test_reset_selected_keeps_name() {
        let mut store = ProfileStore::default();
        let profile = store.create_profile("Custom").unwrap();
        profile.swap_face_buttons = true;
        profile.left_stick = StickConfig::mouse(25.0, false);
        profile.set_mapping(&key(Section::Buttons, "X"), Action::key(45, "X"));

        store.reset_selected();

        assert_eq!(store.selected(), &GamepadProfile::new("Custom"));
    }
}
