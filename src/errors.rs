use std::fmt;

#[derive(Debug, Clone)]
pub enum SalatError {
    Validation(String),
    NotFound(String),
    PermissionDenied(String),
    Upstream(String),
    Timeout(String),
    Unsupported(String),
    NoResults(String),
    Serialization(String),
    FileOperation(String),
    DateParse(String),
    Config(String),
}

impl SalatError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            SalatError::Validation(_) => "E001",
            SalatError::NotFound(_) => "E002",
            SalatError::PermissionDenied(_) => "E003",
            SalatError::Upstream(_) => "E004",
            SalatError::Timeout(_) => "E005",
            SalatError::Unsupported(_) => "E006",
            SalatError::NoResults(_) => "E007",
            SalatError::Serialization(_) => "E008",
            SalatError::FileOperation(_) => "E009",
            SalatError::DateParse(_) => "E010",
            SalatError::Config(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            SalatError::Validation(_) => "Validation Error",
            SalatError::NotFound(_) => "Resource Not Found",
            SalatError::PermissionDenied(_) => "Permission Denied",
            SalatError::Upstream(_) => "Upstream Service Error",
            SalatError::Timeout(_) => "Upstream Timeout",
            SalatError::Unsupported(_) => "Not Supported",
            SalatError::NoResults(_) => "No Results",
            SalatError::Serialization(_) => "Serialization Error",
            SalatError::FileOperation(_) => "File Operation Error",
            SalatError::DateParse(_) => "Date Parse Error",
            SalatError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            SalatError::Validation(msg)
            | SalatError::NotFound(msg)
            | SalatError::PermissionDenied(msg)
            | SalatError::Upstream(msg)
            | SalatError::Timeout(msg)
            | SalatError::Unsupported(msg)
            | SalatError::NoResults(msg)
            | SalatError::Serialization(msg)
            | SalatError::FileOperation(msg)
            | SalatError::DateParse(msg)
            | SalatError::Config(msg) => msg,
        }
    }

    /// 是否属于“空结果”类状态（无城市匹配、无清真寺、不支持的出行方式）
    ///
    /// 这类状态在界面上按普通空态展示，而不是错误
    pub fn is_empty_state(&self) -> bool {
        matches!(
            self,
            SalatError::NoResults(_) | SalatError::Unsupported(_)
        )
    }

    /// 映射到 HTTP 状态码
    #[cfg(feature = "server")]
    pub fn http_status(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            SalatError::Validation(_) | SalatError::DateParse(_) => StatusCode::BAD_REQUEST,
            SalatError::NotFound(_) => StatusCode::NOT_FOUND,
            SalatError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            SalatError::Upstream(_) => StatusCode::BAD_GATEWAY,
            SalatError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            // 空态不是错误，保持 200 由 envelope 中的 code 区分
            SalatError::Unsupported(_) | SalatError::NoResults(_) => StatusCode::OK,
            SalatError::Serialization(_)
            | SalatError::FileOperation(_)
            | SalatError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    #[cfg(feature = "server")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for SalatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 默认使用简洁格式
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SalatError {}

// 便捷的构造函数
impl SalatError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        SalatError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        SalatError::NotFound(msg.into())
    }

    pub fn permission_denied<T: Into<String>>(msg: T) -> Self {
        SalatError::PermissionDenied(msg.into())
    }

    pub fn upstream<T: Into<String>>(msg: T) -> Self {
        SalatError::Upstream(msg.into())
    }

    pub fn timeout<T: Into<String>>(msg: T) -> Self {
        SalatError::Timeout(msg.into())
    }

    pub fn unsupported<T: Into<String>>(msg: T) -> Self {
        SalatError::Unsupported(msg.into())
    }

    pub fn no_results<T: Into<String>>(msg: T) -> Self {
        SalatError::NoResults(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        SalatError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        SalatError::FileOperation(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        SalatError::DateParse(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        SalatError::Config(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for SalatError {
    fn from(err: std::io::Error) -> Self {
        SalatError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SalatError {
    fn from(err: serde_json::Error) -> Self {
        SalatError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for SalatError {
    fn from(err: chrono::ParseError) -> Self {
        SalatError::DateParse(err.to_string())
    }
}

impl From<ureq::Error> for SalatError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Timeout(_) => SalatError::Timeout(err.to_string()),
            ureq::Error::StatusCode(status) => {
                SalatError::Upstream(format!("upstream responded with status {}", status))
            }
            other => SalatError::Upstream(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SalatError>;
