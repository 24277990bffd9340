use std::net::IpAddr;

use poem::Request;
use uuid::Uuid;

use crate::types::internal::user::CurrentUser;

use super::{request_id::RequestId, request_source::RequestSource};

/// Request context that flows through all layers
///
/// Resolved once per request. Carries the caller (if a valid session was
/// presented) plus the metadata needed for logging and auditing.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// IP address of the client making the request
    pub ip_address: Option<IpAddr>,

    pub user_agent: Option<String>,

    /// Unique identifier for this request (for tracing across layers)
    pub request_id: RequestId,

    /// Source of the request (API, CLI, or System)
    pub source: RequestSource,

    /// Actor who initiated the operation
    pub actor_id: String,

    /// Authenticated caller; `None` when no valid session was presented
    pub caller: Option<CurrentUser>,
}

impl RequestContext {
    fn base(source: RequestSource, actor_id: String) -> Self {
        Self {
            ip_address: None,
            user_agent: None,
            request_id: RequestId(Uuid::new_v4()),
            source,
            actor_id,
            caller: None,
        }
    }

    /// Create a RequestContext for CLI operations
    pub fn for_cli(command_name: &str) -> Self {
        Self::base(RequestSource::CLI, format!("cli:{}", command_name))
    }

    /// Create a RequestContext for system operations
    pub fn for_system(operation_name: &str) -> Self {
        Self::base(RequestSource::System, format!("system:{}", operation_name))
    }

    /// Unauthenticated API context carrying client IP and user agent
    pub fn for_request(req: &Request) -> Self {
        let mut ctx = Self::base(RequestSource::API, "anonymous".to_string());
        ctx.ip_address = Self::extract_ip_address(req);
        ctx.user_agent = req.header("User-Agent").map(str::to_string);
        ctx
    }

    /// Extract IP address from request headers
    ///
    /// Checks X-Forwarded-For, X-Real-IP, and falls back to remote address.
    pub fn extract_ip_address(req: &Request) -> Option<IpAddr> {
        // Proxy/load balancer
        if let Some(forwarded) = req.header("X-Forwarded-For") {
            if let Some(ip) = forwarded.split(',').next() {
                return ip.trim().parse().ok();
            }
        }

        // nginx
        if let Some(real_ip) = req.header("X-Real-IP") {
            return real_ip.trim().parse().ok();
        }

        req.remote_addr().as_socket_addr().map(|addr| addr.ip())
    }

    /// Attach the authenticated caller and use their id as actor
    pub fn with_caller(mut self, caller: CurrentUser) -> Self {
        self.actor_id = caller.id().to_string();
        self.caller = Some(caller);
        self
    }

    pub fn with_ip_address(mut self, ip_address: IpAddr) -> Self {
        self.ip_address = Some(ip_address);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.caller.is_some()
    }

    pub fn caller(&self) -> Option<&CurrentUser> {
        self.caller.as_ref()
    }
}
