use anyhow::{Result, anyhow};
use directories::UserDirs;
use handctl::Profile;
use log::info;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

/// On-disk profile directory (`~/.config/handctl`) and the active pointer.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    pub active_name: String,
    pub profiles_dir: PathBuf,
    pub active_ptr: PathBuf,
}

fn config_dir() -> Result<PathBuf> {
    let dirs = UserDirs::new().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(dirs.home_dir().join(".config").join("handctl"))
}

pub fn default_profile_text() -> &'static str {
    include_str!("../profiles/default.toml")
}

/// Read, parse and validate a profile file.
pub fn load_profile_file(path: &Path) -> Result<Profile> {
    let txt = fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
    Profile::from_toml_str(&txt).map_err(|e| anyhow!("{}: {e}", path.display()))
}

impl ProfileStore {
    pub fn open() -> Result<Self> {
        let cfgdir = config_dir()?;
        Ok(Self {
            active_name: String::new(),
            profiles_dir: cfgdir.join("profiles"),
            active_ptr: cfgdir.join("active"),
        })
    }

    /// Open the store, installing the bundled default profile and pointer on
    /// first use.
    pub fn load_or_install_default() -> Result<Self> {
        let mut store = Self::open()?;
        store.install_default(false)?;

        if !store.active_ptr.exists() {
            let mut f = fs::File::create(&store.active_ptr)?;
            f.write_all(b"default")?;
        }
        store.active_name = fs::read_to_string(&store.active_ptr)?.trim().to_string();
        if store.active_name.is_empty() {
            return Err(anyhow!(
                "active profile pointer {} is empty",
                store.active_ptr.display()
            ));
        }
        Ok(store)
    }

    /// Write `default.toml` unless it exists (or `force`). Returns its path.
    pub fn install_default(&self, force: bool) -> Result<PathBuf> {
        fs::create_dir_all(&self.profiles_dir)?;
        let def_path = self.path_of("default");
        if force || !def_path.exists() {
            fs::write(&def_path, default_profile_text())?;
            info!("installed default profile at {}", def_path.display());
        }
        Ok(def_path)
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.profiles_dir.join(format!("{name}.toml"))
    }

    pub fn load(&self, name: &str) -> Result<Profile> {
        load_profile_file(&self.path_of(name))
    }

    /// Point `active` at `name` after checking the profile loads.
    pub fn set_active(&mut self, name: &str) -> Result<()> {
        let p = self.path_of(name);
        if !p.exists() {
            return Err(anyhow!("profile not found: {}", p.display()));
        }
        self.load(name)?;
        fs::write(&self.active_ptr, name.as_bytes())?;
        self.active_name = name.to_string();
        Ok(())
    }

    pub fn list_profiles(&self) -> Vec<String> {
        let mut v = Vec::new();
        if let Ok(rd) = fs::read_dir(&self.profiles_dir) {
            for e in rd.flatten() {
                let path = e.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        v.push(stem.to_string());
                    }
                }
            }
        }
        v.sort();
        v
    }
}

/// Where a running pipeline gets its profile from, and reloads it from.
#[derive(Debug, Clone)]
pub enum ProfileSource {
    Named { store: ProfileStore, name: String },
    File(PathBuf),
}

impl ProfileSource {
    pub fn load(&self) -> Result<Profile> {
        match self {
            Self::Named { store, name } => store.load(name),
            Self::File(path) => load_profile_file(path),
        }
    }

    pub fn path(&self) -> PathBuf {
        match self {
            Self::Named { store, name } => store.path_of(name),
            Self::File(path) => path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_default_profile_is_valid() {
        let p = Profile::from_toml_str(default_profile_text()).unwrap();
        assert_eq!(p.meta.name.as_deref(), Some("default"));
        assert!(!p.bindings.is_empty());
        assert!(p.build().is_ok());
    }

    #[test]
    fn list_and_switch_in_temp_dir() {
        let dir = std::env::temp_dir().join(format!("handctl-profiles-{}", std::process::id()));
        let mut store = ProfileStore {
            active_name: "default".into(),
            profiles_dir: dir.join("profiles"),
            active_ptr: dir.join("active"),
        };
        store.install_default(false).unwrap();
        fs::write(store.path_of("empty"), "").unwrap();
        fs::write(store.path_of("broken"), "[[bindings]]\nname = 3\n").unwrap();

        assert_eq!(store.list_profiles(), ["broken", "default", "empty"]);
        store.set_active("empty").unwrap();
        assert_eq!(fs::read_to_string(&store.active_ptr).unwrap(), "empty");
        assert!(store.set_active("broken").is_err());
        assert!(store.set_active("missing").is_err());
        assert_eq!(store.active_name, "empty");

        let _ = fs::remove_dir_all(&dir);
    }
}
