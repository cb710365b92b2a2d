//! Tool registry for managing available tools

use crate::config::{SearchSettings, ToolSettings, WeatherSettings};
use crate::error::{ConfigError, Result};
use crate::tools::builtin::{TimeTool, TimeToolFactory, WeatherTool, WebContentTool};
use crate::tools::{Tool, ToolExecutor};
use std::collections::BTreeMap;

/// Names of the built-in tools, in registration order
pub const BUILTIN_TOOLS: [&str; 3] = [WebContentTool::NAME, TimeTool::NAME, WeatherTool::NAME];

/// Registry for managing tool creation and registration
pub struct ToolRegistry {
    factories: BTreeMap<String, Box<dyn ToolFactory>>,
}

/// Factory trait for creating tools
pub trait ToolFactory: Send + Sync {
    /// Create a new instance of the tool
    fn create(&self) -> Box<dyn Tool>;

    /// Get the name of the tool this factory creates
    fn tool_name(&self) -> &str;

    /// Get the description of the tool this factory creates
    fn tool_description(&self) -> &str;
}

struct WebContentToolFactory {
    settings: SearchSettings,
}

impl ToolFactory for WebContentToolFactory {
    fn create(&self) -> Box<dyn Tool> {
        Box::new(WebContentTool::new(&self.settings))
    }

    fn tool_name(&self) -> &str {
        WebContentTool::NAME
    }

    fn tool_description(&self) -> &str {
        WebContentTool::DESCRIPTION
    }
}

struct WeatherToolFactory {
    settings: WeatherSettings,
}

impl ToolFactory for WeatherToolFactory {
    fn create(&self) -> Box<dyn Tool> {
        Box::new(WeatherTool::new(&self.settings))
    }

    fn tool_name(&self) -> &str {
        WeatherTool::NAME
    }

    fn tool_description(&self) -> &str {
        WeatherTool::DESCRIPTION
    }
}

impl ToolRegistry {
    /// Create an empty tool registry
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry holding the built-in tools, wired to the given settings
    pub fn with_settings(settings: &ToolSettings) -> Self {
        let mut registry = Self::new();
        registry.register_factory(Box::new(WebContentToolFactory {
            settings: settings.search.clone(),
        }));
        registry.register_factory(Box::new(TimeToolFactory));
        registry.register_factory(Box::new(WeatherToolFactory {
            settings: settings.weather.clone(),
        }));
        registry
    }

    /// Register a tool factory
    pub fn register_factory(&mut self, factory: Box<dyn ToolFactory>) {
        self.factories.insert(factory.tool_name().to_string(), factory);
    }

    /// Create a tool by name
    pub fn create_tool(&self, name: &str) -> Option<Box<dyn Tool>> {
        self.factories.get(name).map(|factory| factory.create())
    }

    /// List all available tool names
    pub fn list_tools(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    /// Get tool information
    pub fn get_tool_info(&self, name: &str) -> Option<(&str, &str)> {
        self.factories
            .get(name)
            .map(|factory| (factory.tool_name(), factory.tool_description()))
    }

    /// Create a tool executor with the specified tools. Every name must be
    /// registered.
    pub fn create_executor(&self, tool_names: &[String]) -> Result<ToolExecutor> {
        let mut executor = ToolExecutor::new();

        for name in tool_names {
            let tool = self
                .create_tool(name)
                .ok_or_else(|| ConfigError::UnknownTool { name: name.clone() })?;
            executor.register_tool(tool);
        }

        Ok(executor)
    }

    /// Create a tool executor with all available tools
    pub fn create_executor_with_all(&self) -> ToolExecutor {
        let mut executor = ToolExecutor::new();

        for factory in self.factories.values() {
            executor.register_tool(factory.create());
        }

        executor
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_settings(&ToolSettings::default())
    }
}

/// Macro to help implement tool factories
#[macro_export]
macro_rules! impl_tool_factory {
    ($factory:ident, $tool:ident, $name:expr, $description:expr) => {
        pub struct $factory;

        impl $crate::tools::ToolFactory for $factory {
            fn create(&self) -> Box<dyn $crate::tools::Tool> {
                Box::new($tool::new())
            }

            fn tool_name(&self) -> &str {
                $name
            }

            fn tool_description(&self) -> &str {
                $description
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_default_registry_has_builtin_tools() {
        let registry = ToolRegistry::default();
        assert_eq!(registry.list_tools(), BUILTIN_TOOLS.to_vec());
    }

    #[test]
    fn test_factory_info_matches_created_tool() {
        let registry = ToolRegistry::default();

        for tool_name in registry.list_tools() {
            let (name, description) = registry.get_tool_info(tool_name).unwrap();
            let tool = registry.create_tool(tool_name).unwrap();
            assert_eq!(tool.name(), name);
            assert_eq!(tool.description(), description);
            assert!(!tool.examples().is_empty(), "{} has no examples", name);

            let schema = tool.parameters_schema();
            assert_eq!(schema["required"][0], "input");
        }
    }

    #[test]
    fn test_create_executor_with_named_tools() {
        let registry = ToolRegistry::default();
        let names: Vec<String> = BUILTIN_TOOLS.iter().map(|s| s.to_string()).collect();
        let executor = registry.create_executor(&names).unwrap();
        assert_eq!(executor.list_tools(), BUILTIN_TOOLS.to_vec());
        assert_eq!(executor.get_tool_definitions().len(), 3);
    }

    #[test]
    fn test_unknown_tool_is_config_error() {
        let registry = ToolRegistry::default();
        let err = registry
            .create_executor(&["check_time".to_string(), "send_email".to_string()])
            .err()
            .unwrap();
        assert!(matches!(
            err,
            Error::Config(ConfigError::UnknownTool { ref name }) if name == "send_email"
        ));
    }

    #[test]
    fn test_executor_with_all() {
        let executor = ToolRegistry::default().create_executor_with_all();
        assert_eq!(executor.len(), BUILTIN_TOOLS.len());
    }
}
