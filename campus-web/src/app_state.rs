use campus_service::SchoolService;
use std::sync::Arc;

/// 应用状态
/// 包含所有需要的服务实例
#[derive(Clone)]
pub struct AppState {
    pub school_service: Arc<dyn SchoolService>,
    /// 配置的对外地址，设置后覆盖按请求头推断的来源
    pub external_url: Option<String>,
}
