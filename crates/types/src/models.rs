use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ValidationError;

/// 制品文件扩展名（与原始文件扩展名无关）
pub const ARTIFACT_EXTENSION: &str = "joblib";

/// 新模型未指定标签时使用的默认标签
pub const DEFAULT_LABEL: &str = "No Label";

/// 根据 (name, version) 生成确定性的制品名称
///
/// 格式: `model__{name}__{version}.joblib`
pub fn artifact_name(name: &str, version: &str) -> String {
    format!("model__{}__{}.{}", name, version, ARTIFACT_EXTENSION)
}

/// 模型状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModelStatus {
    #[serde(rename = "deployed")]
    Deployed,
    #[serde(rename = "archived")]
    Archived,
    #[default]
    #[serde(rename = "under review")]
    UnderReview,
    #[serde(rename = "special-use")]
    SpecialUse,
}

impl ModelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deployed => "deployed",
            Self::Archived => "archived",
            Self::UnderReview => "under review",
            Self::SpecialUse => "special-use",
        }
    }
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deployed" => Ok(Self::Deployed),
            "archived" => Ok(Self::Archived),
            "under review" => Ok(Self::UnderReview),
            "special-use" => Ok(Self::SpecialUse),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// 注册表中的一条模型记录（含已解析的标签）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: i64,
    pub name: String,
    pub version: String,
    #[serde(rename = "file_path")]
    pub artifact_path: String,
    pub description: String,
    pub created_at: String,
    pub framework: String,
    pub framework_version: String,
    pub training_data: String,
    pub hyperparameters: String,
    pub evaluation_metrics: String,
    #[serde(rename = "model_author")]
    pub author: String,
    pub last_updated: String,
    #[serde(rename = "uploaded_file_name")]
    pub uploaded_artifact_name: String,
    pub features: String,
    pub status: ModelStatus,
    pub labels: Vec<String>,
}

/// 插入请求
///
/// `hyperparameters`、`evaluation_metrics`、`features` 为调用方序列化好的不透明字符串。
#[derive(Debug, Clone)]
pub struct NewModel {
    pub name: String,
    pub version: String,
    pub artifact_path: PathBuf,
    pub description: String,
    pub framework: String,
    pub framework_version: String,
    pub training_data: String,
    pub hyperparameters: String,
    pub evaluation_metrics: String,
    pub author: String,
    pub features: String,
    pub status: ModelStatus,
    pub labels: Vec<String>,
}

impl NewModel {
    /// 创建插入请求，其余字段使用默认值
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        artifact_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            artifact_path: artifact_path.into(),
            description: "No description.".to_string(),
            framework: "No framework specified.".to_string(),
            framework_version: "No framework version specified.".to_string(),
            training_data: "No training data specified.".to_string(),
            hyperparameters: "No hyperparameters specified".to_string(),
            evaluation_metrics: "No evaluation metrics specified".to_string(),
            author: "ADO-AI".to_string(),
            features: String::new(),
            status: ModelStatus::default(),
            labels: vec![DEFAULT_LABEL.to_string()],
        }
    }

    /// 校验身份字段（name 和 version 必须非空）
    pub fn validate_identity(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() || self.version.trim().is_empty() {
            return Err(ValidationError::MissingIdentity);
        }
        Ok(())
    }

    /// 该模型在对象存储中的制品名称
    pub fn artifact_name(&self) -> String {
        artifact_name(&self.name, &self.version)
    }
}

/// 允许被 update 修改的列（静态白名单）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatableField {
    Description,
    Framework,
    FrameworkVersion,
    TrainingData,
    Hyperparameters,
    EvaluationMetrics,
    Author,
    Features,
    Status,
}

impl UpdatableField {
    /// 对应的数据库列名
    pub fn column(&self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Framework => "framework",
            Self::FrameworkVersion => "framework_version",
            Self::TrainingData => "training_data",
            Self::Hyperparameters => "hyperparameters",
            Self::EvaluationMetrics => "evaluation_metrics",
            Self::Author => "model_author",
            Self::Features => "features",
            Self::Status => "status",
        }
    }
}

/// 部分字段更新（None 表示不修改）
#[derive(Debug, Clone, Default)]
pub struct ModelUpdate {
    pub description: Option<String>,
    pub framework: Option<String>,
    pub framework_version: Option<String>,
    pub training_data: Option<String>,
    pub hyperparameters: Option<String>,
    pub evaluation_metrics: Option<String>,
    pub author: Option<String>,
    pub features: Option<String>,
    pub status: Option<ModelStatus>,
}

impl ModelUpdate {
    /// 收集所有非空字段，顺序固定
    pub fn fields(&self) -> Vec<(UpdatableField, String)> {
        let candidates = [
            (UpdatableField::Description, self.description.clone()),
            (UpdatableField::Framework, self.framework.clone()),
            (UpdatableField::FrameworkVersion, self.framework_version.clone()),
            (UpdatableField::TrainingData, self.training_data.clone()),
            (UpdatableField::Hyperparameters, self.hyperparameters.clone()),
            (UpdatableField::EvaluationMetrics, self.evaluation_metrics.clone()),
            (UpdatableField::Author, self.author.clone()),
            (UpdatableField::Features, self.features.clone()),
            (
                UpdatableField::Status,
                self.status.map(|s| s.as_str().to_string()),
            ),
        ];

        candidates
            .into_iter()
            .filter_map(|(field, value)| value.map(|v| (field, v)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_name_ignores_source_extension() {
        let model = NewModel::new("RF1", "1.0", "/tmp/forest.pkl");
        assert_eq!(model.artifact_name(), "model__RF1__1.0.joblib");
        assert_eq!(artifact_name("RF1", "1.0"), "model__RF1__1.0.joblib");
    }

    #[test]
    fn test_validate_identity() {
        assert!(NewModel::new("RF1", "1.0", "a.joblib")
            .validate_identity()
            .is_ok());
        assert!(NewModel::new("", "1.0", "a.joblib")
            .validate_identity()
            .is_err());
        assert!(NewModel::new("RF1", "  ", "a.joblib")
            .validate_identity()
            .is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ModelStatus::Deployed,
            ModelStatus::Archived,
            ModelStatus::UnderReview,
            ModelStatus::SpecialUse,
        ] {
            assert_eq!(status.as_str().parse::<ModelStatus>().unwrap(), status);
        }
        assert!("retired".parse::<ModelStatus>().is_err());
    }

    #[test]
    fn test_update_fields_only_collects_present_values() {
        let update = ModelUpdate {
            description: Some("new".to_string()),
            status: Some(ModelStatus::Archived),
            ..Default::default()
        };

        let fields = update.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], (UpdatableField::Description, "new".to_string()));
        assert_eq!(fields[1], (UpdatableField::Status, "archived".to_string()));
        assert!(ModelUpdate::default().is_empty());
    }
}
