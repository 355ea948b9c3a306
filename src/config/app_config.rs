use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use registry_local::DATABASE_FILE;
use registry_storage::{BackendConfig, DEFAULT_DOWNLOAD_DIR};

/// 配置目录名
const REGISTRY_DIR: &str = ".mreg";

/// 配置作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    Local,
    Global,
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// 注册表目录（可选，默认: ~/.mreg 或 ./.mreg）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_path: Option<PathBuf>,

    /// fetch --download 的默认目录（默认: Downloads）
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// export 的默认输出文件（默认: models_export.csv）
    #[serde(default = "default_export_path")]
    pub export_path: PathBuf,

    /// 每次对象存储调用的超时秒数（不设置则不限制）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_timeout_secs: Option<u64>,

    /// 覆盖内置 SQL 语句的文件（可选）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queries_path: Option<PathBuf>,

    /// 制品存储后端
    #[serde(default)]
    pub storage: BackendConfig,
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DOWNLOAD_DIR)
}

fn default_export_path() -> PathBuf {
    PathBuf::from("models_export.csv")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            registry_path: None,
            download_dir: default_download_dir(),
            export_path: default_export_path(),
            blob_timeout_secs: None,
            queries_path: None,
            storage: BackendConfig::default(),
        }
    }
}

impl AppConfig {
    /// 全局配置目录：~/.mreg/
    pub fn global_registry_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(REGISTRY_DIR)
    }

    /// 本地配置目录：./.mreg/
    pub fn local_registry_dir() -> PathBuf {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(REGISTRY_DIR)
    }

    /// 检查本地配置是否存在
    /// 注意：如果当前目录是用户主目录，则不认为是本地配置
    pub fn has_local_config() -> bool {
        let current_dir = match std::env::current_dir() {
            Ok(dir) => dir,
            Err(_) => return false,
        };

        let global_parent = Self::global_registry_dir()
            .parent()
            .map(|p| p.to_path_buf());

        if let Some(home) = global_parent {
            let current_canonical = current_dir.canonicalize().unwrap_or(current_dir.clone());
            let home_canonical = home.canonicalize().unwrap_or(home);

            if current_canonical == home_canonical {
                return false;
            }
        }

        Self::local_registry_dir().join("config.toml").exists()
    }

    /// 验证作用域标志（不能同时指定 local 和 global）
    pub fn validate_scope_flags(local: bool, global: bool) -> Result<()> {
        if local && global {
            anyhow::bail!("Cannot specify both --local and --global, please choose one");
        }
        Ok(())
    }

    /// 获取当前作用域名称
    /// 返回 "local" 或 "global"
    pub fn get_scope_name(force_local: bool, force_global: bool) -> &'static str {
        if force_local {
            "local"
        } else if force_global {
            "global"
        } else if Self::has_local_config() {
            "local"
        } else {
            "global"
        }
    }

    /// 根据 local 标志获取配置目录
    pub fn get_registry_dir(local: bool) -> PathBuf {
        if local {
            Self::local_registry_dir()
        } else {
            Self::global_registry_dir()
        }
    }

    /// 加载配置：根据 local/global 标志或优先级加载
    /// - local = true: 强制使用本地配置
    /// - global = true: 强制使用全局配置
    /// - 两者都为 false: 优先本地配置，其次全局配置
    pub fn load_with_scope(force_local: bool, force_global: bool) -> Result<Self> {
        Self::validate_scope_flags(force_local, force_global)?;

        let scope = if force_local {
            ConfigScope::Local
        } else if force_global {
            ConfigScope::Global
        } else if Self::has_local_config() {
            ConfigScope::Local
        } else {
            ConfigScope::Global
        };

        match scope {
            ConfigScope::Local => {
                Self::load_from_path(&Self::local_registry_dir().join("config.toml"), true)
            }
            ConfigScope::Global => {
                Self::load_from_path(&Self::global_registry_dir().join("config.toml"), false)
            }
        }
    }

    /// 从指定路径加载配置文件；文件不存在时使用默认配置
    fn load_from_path(path: &Path, is_local: bool) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Self = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?;
            tracing::debug!("Loaded app config from: {}", path.display());
            config
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };

        // 本地配置强制使用本地注册表目录
        if is_local {
            config.registry_path = Some(Self::local_registry_dir());
        }

        tracing::debug!("Storage provider: {}", config.storage.provider);

        Ok(config)
    }

    /// 获取注册表目录
    pub fn get_registry_path(&self) -> PathBuf {
        self.registry_path
            .clone()
            .unwrap_or_else(Self::global_registry_dir)
    }

    /// 获取数据库文件路径
    pub fn get_database_path(&self) -> PathBuf {
        self.get_registry_path().join(DATABASE_FILE)
    }

    /// 对象存储超时
    pub fn blob_timeout(&self) -> Option<Duration> {
        self.blob_timeout_secs.map(Duration::from_secs)
    }

    /// 解析存储后端配置：local 后端未指定 root 时放在注册表目录下
    pub fn resolve_storage(&self) -> BackendConfig {
        let mut storage = self.storage.clone();
        if storage.provider == "local" && storage.root.is_none() {
            storage.root = Some(self.get_registry_path().join("artifacts"));
        }
        storage
    }

    /// 确保必要的目录存在
    pub fn ensure_dirs(&self) -> Result<()> {
        let registry_path = self.get_registry_path();
        std::fs::create_dir_all(&registry_path).with_context(|| {
            format!(
                "Failed to create registry directory: {}",
                registry_path.display()
            )
        })?;
        Ok(())
    }

    /// 保存配置到指定目录
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let config_path = dir.join("config.toml");
        let content = toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(config_path)
    }
}
