//! Method-name to handler routing.
//!
//! The built-in methods need the server's identity and tool registry, so
//! they are stored as tags that the server resolves against its own state.
//! Registering a handler under a built-in name replaces the built-in.

use std::collections::HashMap;

use super::handler::Handler;

pub const METHOD_INITIALIZE: &str = "initialize";
pub const METHOD_TOOLS_LIST: &str = "tools/list";
pub const METHOD_TOOLS_CALL: &str = "tools/call";
/// Short alias some clients send for `tools/call`.
pub const METHOD_CALL: &str = "call";

/// What a method name resolves to.
#[derive(Clone)]
pub enum Route {
    Initialize,
    ToolsList,
    ToolsCall,
    Custom(Handler),
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialize => f.write_str("Initialize"),
            Self::ToolsList => f.write_str("ToolsList"),
            Self::ToolsCall => f.write_str("ToolsCall"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Routes method names to built-ins or registered handlers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    routes: HashMap<String, Route>,
}

impl Dispatcher {
    /// Creates a dispatcher with the built-in methods registered.
    pub fn new() -> Self {
        let mut routes = HashMap::new();
        routes.insert(METHOD_INITIALIZE.to_string(), Route::Initialize);
        routes.insert(METHOD_TOOLS_LIST.to_string(), Route::ToolsList);
        routes.insert(METHOD_TOOLS_CALL.to_string(), Route::ToolsCall);
        routes.insert(METHOD_CALL.to_string(), Route::ToolsCall);
        Self { routes }
    }

    /// Registers `handler` under `method`, replacing any previous route.
    pub fn register(&mut self, method: impl Into<String>, handler: Handler) {
        self.routes.insert(method.into(), Route::Custom(handler));
    }

    /// Returns the route for `method`, or `None` when it is unknown.
    pub fn resolve(&self, method: &str) -> Option<&Route> {
        self.routes.get(method)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::handler::handler_fn;

    #[test]
    fn test_builtins_are_registered() {
        let dispatcher = Dispatcher::new();
        assert!(matches!(
            dispatcher.resolve("initialize"),
            Some(Route::Initialize)
        ));
        assert!(matches!(
            dispatcher.resolve("tools/list"),
            Some(Route::ToolsList)
        ));
        assert!(matches!(
            dispatcher.resolve("tools/call"),
            Some(Route::ToolsCall)
        ));
        assert!(matches!(dispatcher.resolve("call"), Some(Route::ToolsCall)));
        assert!(dispatcher.resolve("unknown").is_none());
    }

    #[test]
    fn test_register_overrides_builtin() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(
            "initialize",
            handler_fn(|_ctx, _params| async { Ok("custom") }),
        );
        assert!(matches!(
            dispatcher.resolve("initialize"),
            Some(Route::Custom(_))
        ));
    }

    #[test]
    fn test_register_custom_method() {
        let mut dispatcher = Dispatcher::new();
        assert!(dispatcher.resolve("CustomHandler").is_none());
        dispatcher.register("CustomHandler", handler_fn(|_ctx, _params| async { Ok(()) }));
        assert!(matches!(
            dispatcher.resolve("CustomHandler"),
            Some(Route::Custom(_))
        ));
    }
}
