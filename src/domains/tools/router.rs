//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! The STDIO transport serves tools through rmcp's `ServerHandler`, which
//! dispatches via a `ToolRouter`. Every route forwards to
//! [`ToolRegistry::invoke`] so both transports share one execution path.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter},
};

use super::ToolRegistry;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(registry: Arc<ToolRegistry>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    registry
        .definitions()
        .iter()
        .fold(ToolRouter::new(), |router, definition| {
            let name = definition.name().to_string();
            let registry = registry.clone();

            router.with_route(ToolRoute::new_dyn(
                definition.tool().clone(),
                move |ctx: ToolCallContext<'_, S>| {
                    let args = ctx.arguments.clone().unwrap_or_default();
                    let registry = registry.clone();
                    let name = name.clone();
                    async move { registry.invoke(&name, args).map_err(McpError::from) }.boxed()
                },
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestServer {}

    #[test]
    fn test_build_router() {
        let registry = Arc::new(ToolRegistry::with_builtin_tools().unwrap());
        let router: ToolRouter<TestServer> = build_tool_router(registry);
        let tools = router.list_all();
        assert_eq!(tools.len(), 2);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"add"));
        assert!(names.contains(&"calculate"));
    }

    #[test]
    fn test_registry_matches_router() {
        let registry = Arc::new(ToolRegistry::with_builtin_tools().unwrap());
        let registry_names: Vec<String> =
            registry.tool_names().into_iter().map(String::from).collect();

        let router: ToolRouter<TestServer> = build_tool_router(registry);
        let router_tools = router.list_all();
        let router_names: Vec<_> = router_tools.iter().map(|t| t.name.as_ref()).collect();

        assert_eq!(registry_names.len(), router_names.len());
        for name in &registry_names {
            assert!(router_names.contains(&name.as_str()));
        }
    }
}
