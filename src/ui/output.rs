use console::Style;
use std::io::{self, Write};
use std::path::Path;

use registry_types::{ModelRecord, Outcome};

/// 命令行输出格式化工具
/// 提供统一的 Cargo 风格输出
pub struct Output {
    green: Style,
    bold: Style,
    dim: Style,
}

impl Output {
    pub fn new() -> Self {
        Self {
            green: Style::new().green().bold(),
            bold: Style::new().bold(),
            dim: Style::new().dim(),
        }
    }

    /// 显示状态消息（如 "Uploading model__a__1.joblib"）
    /// 格式: "   Uploading target"（动词右对齐到 12 字符）
    pub fn status(&self, action: &str, target: &str) {
        eprintln!("{:>12} {}", self.green.apply_to(action), target);
    }

    /// 开始执行操作的状态消息（会在前面自动添加空行）
    pub fn begin_operation(&self, action: &str, target: &str) {
        eprintln!();
        eprintln!("{:>12} {}", self.green.apply_to(action), target);
    }

    /// 显示数据库信息
    /// 格式: "    Registry /path/to/model_registry.db (12 models, local storage)"
    /// 自动在后面添加空行
    pub fn database_info(&self, path: &Path, model_count: i64, backend: &str) {
        eprintln!(
            "{:>12} {} {}",
            self.green.apply_to("Registry"),
            path.display(),
            self.dim
                .apply_to(format!("({} models, {} storage)", model_count, backend))
        );
        eprintln!();
    }

    /// 显示创建/查找资源消息
    /// 格式: "    Creating config at /path/to/config"
    pub fn resource_action(&self, action: &str, resource: &str, path: &Path) {
        eprintln!(
            "{:>12} {} at {}",
            self.green.apply_to(action),
            resource,
            path.display()
        );
    }

    /// 显示完成消息
    /// 格式: "    Finished action for scope"
    /// 自动在前面添加空行
    pub fn finish(&self, action: &str, scope: &str) {
        eprintln!();
        eprintln!(
            "{:>12} {} for {} scope",
            self.green.apply_to("Finished"),
            action,
            scope
        );
    }

    /// 显示操作结果：成功为绿色 Done，失败为红色 Error
    pub fn outcome(&self, outcome: &Outcome) {
        if outcome.success {
            eprintln!("{:>12} {}", self.green.apply_to("Done"), outcome.message);
        } else {
            self.error(&outcome.message);
        }
    }

    /// 显示模型记录
    /// 格式: "RF1 1.0 (under review) [prod, cv]"
    ///       "      description  ..."
    pub fn record(&self, record: &ModelRecord) {
        let labels = if record.labels.is_empty() {
            String::new()
        } else {
            format!(" {}", self.dim.apply_to(format!("[{}]", record.labels.join(", "))))
        };

        println!(
            "{} {} {}{}",
            self.bold.apply_to(&record.name),
            record.version,
            self.dim.apply_to(format!("({})", record.status)),
            labels
        );

        let fields = [
            ("artifact", &record.uploaded_artifact_name),
            ("source", &record.artifact_path),
            ("description", &record.description),
            ("framework", &record.framework),
            ("version", &record.framework_version),
            ("training", &record.training_data),
            ("params", &record.hyperparameters),
            ("metrics", &record.evaluation_metrics),
            ("features", &record.features),
            ("author", &record.author),
            ("created", &record.created_at),
            ("updated", &record.last_updated),
        ];

        for (name, value) in fields {
            if value.is_empty() {
                continue;
            }
            println!("{:>12} {}", self.dim.apply_to(name), value);
        }
    }

    /// 显示注意事项（右对齐）
    pub fn note(&self, message: &str) {
        eprintln!("{:>12} {}", self.dim.apply_to("Note"), message);
    }

    /// 显示警告（黄色，右对齐）
    /// 自动在前面添加空行
    pub fn warning(&self, message: &str) {
        eprintln!();
        eprintln!(
            "{:>12} {}",
            Style::new().yellow().bold().apply_to("Warning"),
            message
        );
        eprintln!();
    }

    /// 显示错误（红色，右对齐）
    pub fn error(&self, message: &str) {
        eprintln!(
            "{:>12} {}",
            Style::new().red().bold().apply_to("Error"),
            message
        );
    }

    /// 显示提示消息（标准输出，右对齐）
    pub fn info(&self, message: &str) {
        println!("{:>12} {}", "", message);
    }

    /// 显示确认提示并读取用户输入
    /// 返回用户是否输入了期望的内容
    pub fn confirm(&self, expected: &str) -> io::Result<bool> {
        println!();
        print!(
            "{:>12} Type {} to confirm: ",
            "",
            Style::new().green().bold().apply_to(expected)
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        Ok(input.trim() == expected)
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
