//! Run configs for a locally installed game.
//!
//! The install root comes from `SC2PATH` or a per-platform default. Game
//! builds live under `Versions/Base<build>`; with no version requested the
//! highest build number is used.

use std::fs;
use std::path::{Path, PathBuf};

use super::{RunConfig, RunConfigVariant, StartOptions, WindowPair};
use crate::error::LaunchError;
use crate::process::{pick_unused_port, LaunchCommand};

/// Environment variable overriding the install directory.
pub const SC2PATH_ENV: &str = "SC2PATH";

const DEFAULT_WINDOW_SIZE: WindowPair = (640, 480);
const DEFAULT_WINDOW_LOCATION: WindowPair = (50, 50);

/// Host operating systems with a known install layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Windows install.
    Windows,
    /// macOS app bundle.
    MacOS,
    /// Linux headless build.
    Linux,
}

impl Platform {
    /// Every platform, in registration order.
    pub const ALL: [Platform; 3] = [Platform::Windows, Platform::MacOS, Platform::Linux];

    /// Platform of the running host, if supported.
    #[must_use]
    pub fn current() -> Option<Self> {
        if cfg!(target_os = "windows") {
            Some(Self::Windows)
        } else if cfg!(target_os = "macos") {
            Some(Self::MacOS)
        } else if cfg!(target_os = "linux") {
            Some(Self::Linux)
        } else {
            None
        }
    }

    /// Registry name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::MacOS => "MacOS",
            Self::Linux => "Linux",
        }
    }

    fn default_data_dir(self) -> PathBuf {
        match self {
            Self::Windows => PathBuf::from("C:/Program Files (x86)/StarCraft II"),
            Self::MacOS => PathBuf::from("/Applications/StarCraft II"),
            Self::Linux => std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_default()
                .join("StarCraftII"),
        }
    }

    /// Binary path relative to a `Versions/Base<build>` directory.
    fn exec_name(self) -> &'static str {
        match self {
            Self::Windows => "SC2_x64.exe",
            Self::MacOS => "SC2.app/Contents/MacOS/SC2",
            Self::Linux => "SC2_x64",
        }
    }

    /// Working directory the binary expects, relative to the data dir.
    fn support_dir(self) -> Option<&'static str> {
        match self {
            Self::Windows => Some("Support64"),
            Self::MacOS | Self::Linux => None,
        }
    }
}

/// Registrable variant for one [`Platform`].
#[derive(Debug, Clone)]
pub struct LocalVariant {
    platform: Platform,
    data_dir: Option<PathBuf>,
}

impl LocalVariant {
    /// Variant locating the install via `SC2PATH` or the platform default.
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            data_dir: None,
        }
    }

    /// Variant with a fixed install directory.
    #[must_use]
    pub fn with_data_dir(platform: Platform, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            data_dir: Some(data_dir.into()),
        }
    }

    fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        std::env::var_os(SC2PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| self.platform.default_data_dir())
    }
}

impl RunConfigVariant for LocalVariant {
    fn name(&self) -> &str {
        self.platform.name()
    }

    fn priority(&self) -> i32 {
        i32::from(Platform::current() == Some(self.platform))
    }

    fn build(&self, version: Option<&str>) -> Result<Box<dyn RunConfig>, LaunchError> {
        let config = LocalRunConfig::new(self.platform, self.data_dir(), version)?;
        Ok(Box::new(config))
    }
}

/// A resolved local install of one game build.
#[derive(Debug, Clone)]
pub struct LocalRunConfig {
    platform: Platform,
    data_dir: PathBuf,
    version: Option<String>,
    build_dir: PathBuf,
}

impl LocalRunConfig {
    /// Locate the build for `version` under `data_dir`.
    pub fn new(
        platform: Platform,
        data_dir: PathBuf,
        version: Option<&str>,
    ) -> Result<Self, LaunchError> {
        let builds = installed_builds(&data_dir.join("Versions"));
        let build = match version {
            Some(v) => builds
                .iter()
                .find(|(_, name)| name.as_str() == format!("Base{v}"))
                .map(|(_, name)| name.clone())
                .ok_or_else(|| LaunchError::VersionNotFound {
                    version: v.to_string(),
                    installed: builds.iter().map(|(_, name)| name.clone()).collect(),
                })?,
            None => builds
                .last()
                .map(|(_, name)| name.clone())
                .ok_or_else(|| LaunchError::ExecutableNotFound(data_dir.join("Versions")))?,
        };

        Ok(Self {
            platform,
            build_dir: data_dir.join("Versions").join(build),
            data_dir,
            version: version.map(str::to_string),
        })
    }

    /// Platform this install belongs to.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Path of the game binary.
    #[must_use]
    pub fn exec_path(&self) -> PathBuf {
        self.build_dir.join(self.platform.exec_name())
    }
}

/// `(build number, directory name)` of every `Base<N>` dir, ascending.
fn installed_builds(versions_dir: &Path) -> Vec<(u64, String)> {
    let Ok(entries) = fs::read_dir(versions_dir) else {
        return Vec::new();
    };
    let mut builds: Vec<(u64, String)> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let build = name.strip_prefix("Base")?.parse().ok()?;
            Some((build, name))
        })
        .collect();
    builds.sort();
    builds
}

/// Directory paths are passed with a trailing separator.
fn dir_arg(path: &Path) -> String {
    let mut s = path.display().to_string();
    if !s.ends_with(std::path::MAIN_SEPARATOR) && !s.ends_with('/') {
        s.push(std::path::MAIN_SEPARATOR);
    }
    s
}

impl RunConfig for LocalRunConfig {
    fn name(&self) -> &str {
        self.platform.name()
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn launch_command(&self, options: &StartOptions) -> Result<LaunchCommand, LaunchError> {
        let port = match options.port {
            Some(port) => port,
            None => pick_unused_port()?,
        };
        let temp_dir = std::env::temp_dir().join(format!("sc2env_{port}"));

        let mut args = vec![
            "-listen".to_string(),
            options.host.clone(),
            "-port".to_string(),
            port.to_string(),
            "-dataDir".to_string(),
            dir_arg(&self.data_dir),
            "-tempDir".to_string(),
            dir_arg(&temp_dir),
        ];
        if options.host.contains(':') {
            args.push("-ipv6".to_string());
        }
        if options.full_screen {
            args.extend(["-displayMode".to_string(), "1".to_string()]);
        } else {
            let (width, height) = options.window_size.unwrap_or(DEFAULT_WINDOW_SIZE);
            let (x, y) = options.window_location.unwrap_or(DEFAULT_WINDOW_LOCATION);
            args.extend([
                "-displayMode".to_string(),
                "0".to_string(),
                "-windowwidth".to_string(),
                width.to_string(),
                "-windowheight".to_string(),
                height.to_string(),
                "-windowx".to_string(),
                x.to_string(),
                "-windowy".to_string(),
                y.to_string(),
            ]);
        }
        if let Some(extra) = &options.extra_args {
            args.extend(extra.iter().cloned());
        }

        Ok(LaunchCommand {
            exec_path: self.exec_path(),
            args,
            cwd: self
                .platform
                .support_dir()
                .map(|dir| self.data_dir.join(dir)),
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn install(builds: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        for build in builds {
            fs::create_dir_all(dir.path().join("Versions").join(build)).expect("mkdir");
        }
        dir
    }

    #[test]
    fn test_newest_build_selected_by_default() {
        let dir = install(&["Base75689", "Base9000", "Base81009", "NotABuild"]);
        let config = LocalRunConfig::new(Platform::Linux, dir.path().to_path_buf(), None).unwrap();
        assert_eq!(
            config.exec_path(),
            dir.path().join("Versions/Base81009/SC2_x64")
        );
        assert_eq!(config.version(), None);
    }

    #[test]
    fn test_explicit_build_selected() {
        let dir = install(&["Base75689", "Base81009"]);
        let config =
            LocalRunConfig::new(Platform::Linux, dir.path().to_path_buf(), Some("75689")).unwrap();
        assert!(config.exec_path().starts_with(dir.path().join("Versions/Base75689")));
        assert_eq!(config.version(), Some("75689"));
    }

    #[test]
    fn test_unknown_build_lists_installed() {
        let dir = install(&["Base75689"]);
        let err = LocalRunConfig::new(Platform::Linux, dir.path().to_path_buf(), Some("1"))
            .unwrap_err();
        match err {
            LaunchError::VersionNotFound { version, installed } => {
                assert_eq!(version, "1");
                assert_eq!(installed, vec!["Base75689".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_install_fails() {
        let dir = install(&[]);
        assert!(matches!(
            LocalRunConfig::new(Platform::Linux, dir.path().to_path_buf(), None),
            Err(LaunchError::ExecutableNotFound(_))
        ));
    }

    #[test]
    fn test_windowed_launch_command() {
        let dir = install(&["Base1"]);
        let config = LocalRunConfig::new(Platform::Linux, dir.path().to_path_buf(), None).unwrap();
        let cmd = config
            .launch_command(&StartOptions {
                port: Some(5001),
                window_size: Some((1024, 768)),
                extra_args: Some(vec!["-norender".to_string()]),
                ..StartOptions::default()
            })
            .unwrap();

        assert_eq!(cmd.port, 5001);
        assert_eq!(&cmd.args[..4], &["-listen", "127.0.0.1", "-port", "5001"]);
        let joined = cmd.args.join(" ");
        assert!(joined.contains("-displayMode 0 -windowwidth 1024 -windowheight 768 -windowx 50 -windowy 50"));
        assert_eq!(cmd.args.last().map(String::as_str), Some("-norender"));
        assert_eq!(cmd.cwd, None);
    }

    #[test]
    fn test_full_screen_ipv6_launch_command() {
        let dir = install(&["Base1"]);
        let config =
            LocalRunConfig::new(Platform::Windows, dir.path().to_path_buf(), None).unwrap();
        let cmd = config
            .launch_command(&StartOptions {
                host: "::1".to_string(),
                port: Some(5002),
                full_screen: true,
                ..StartOptions::default()
            })
            .unwrap();

        assert!(cmd.args.contains(&"-ipv6".to_string()));
        assert!(cmd.args.join(" ").ends_with("-displayMode 1"));
        assert_eq!(cmd.cwd, Some(dir.path().join("Support64")));
        assert!(cmd.exec_path.ends_with("SC2_x64.exe"));
    }

    #[test]
    fn test_only_host_platform_is_eligible() {
        let eligible: Vec<Platform> = Platform::ALL
            .into_iter()
            .filter(|p| LocalVariant::new(*p).priority() > 0)
            .collect();
        assert_eq!(eligible, Platform::current().into_iter().collect::<Vec<_>>());
    }
}
