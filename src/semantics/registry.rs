//! Service capabilities.
//!
//! The compiler never talks to a hub itself; it asks a
//! [`CapabilityRegistry`] for a service's signature. [`Hub`] is the plain
//! in-memory registry, usually deserialized from a JSON document:
//!
//! ```json
//! {
//!   "http": {
//!     "commands": {
//!       "fetch": {
//!         "arguments": { "url": { "type": "string", "required": true } },
//!         "output": "any"
//!       }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::Type;

pub trait CapabilityRegistry: Send + Sync {
    fn lookup(&self, service: &str) -> Option<&ServiceSignature>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentSignature {
    /// Textual type, parsed with [`Type::parse`]. Unknown spellings act as `any`.
    #[serde(rename = "type", default = "any_type")]
    pub ty: String,
    #[serde(default)]
    pub required: bool,
}

impl ArgumentSignature {
    pub fn new(ty: impl Into<String>, required: bool) -> Self {
        Self {
            ty: ty.into(),
            required,
        }
    }

    pub fn to_type(&self) -> Type {
        Type::parse(&self.ty).unwrap_or(Type::Any)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSignature {
    #[serde(default)]
    pub arguments: BTreeMap<String, ArgumentSignature>,
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSignature {
    #[serde(default)]
    pub arguments: BTreeMap<String, ArgumentSignature>,
    #[serde(default)]
    pub output: Option<String>,
    /// Events a `when` block can listen to on this command's output.
    #[serde(default)]
    pub events: BTreeMap<String, EventSignature>,
}

impl CommandSignature {
    pub fn with_argument(mut self, name: &str, argument: ArgumentSignature) -> Self {
        self.arguments.insert(name.to_string(), argument);
        self
    }

    pub fn with_output(mut self, output: &str) -> Self {
        self.output = Some(output.to_string());
        self
    }

    pub fn with_event(mut self, name: &str, event: EventSignature) -> Self {
        self.events.insert(name.to_string(), event);
        self
    }

    pub fn output_type(&self) -> Type {
        output_type(self.output.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSignature {
    #[serde(default)]
    pub commands: BTreeMap<String, CommandSignature>,
}

impl ServiceSignature {
    pub fn with_command(mut self, name: &str, command: CommandSignature) -> Self {
        self.commands.insert(name.to_string(), command);
        self
    }

    pub fn command(&self, name: &str) -> Option<&CommandSignature> {
        self.commands.get(name)
    }
}

/// In-memory registry keyed by service name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hub {
    services: BTreeMap<String, ServiceSignature>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn insert(&mut self, name: impl Into<String>, service: ServiceSignature) {
        self.services.insert(name.into(), service);
    }

    pub fn with_service(mut self, name: impl Into<String>, service: ServiceSignature) -> Self {
        self.insert(name, service);
        self
    }

    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }
}

impl CapabilityRegistry for Hub {
    fn lookup(&self, service: &str) -> Option<&ServiceSignature> {
        self.services.get(service)
    }
}

fn any_type() -> String {
    "any".to_string()
}

fn output_type(output: Option<&str>) -> Type {
    output.and_then(Type::parse).unwrap_or(Type::Any)
}

impl EventSignature {
    pub fn output_type(&self) -> Type {
        output_type(self.output.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_from_json() {
        let hub = Hub::from_json(
            r#"{
                "http": {
                    "commands": {
                        "fetch": {
                            "arguments": {"url": {"type": "string", "required": true}},
                            "output": "map[string,any]"
                        },
                        "server": {
                            "events": {"listen": {"arguments": {"path": {}}}}
                        }
                    }
                }
            }"#,
        )
        .unwrap();
        let http = hub.lookup("http").unwrap();
        let fetch = http.command("fetch").unwrap();
        assert!(fetch.arguments["url"].required);
        assert_eq!(fetch.arguments["url"].to_type(), Type::String);
        assert_eq!(fetch.output_type(), Type::map(Type::String, Type::Any));
        let server = http.command("server").unwrap();
        assert_eq!(server.events["listen"].arguments["path"].to_type(), Type::Any);
        assert!(hub.lookup("slack").is_none());
    }

    #[test]
    fn builder() {
        let hub = Hub::new().with_service(
            "alpine",
            ServiceSignature::default().with_command(
                "echo",
                CommandSignature::default()
                    .with_argument("message", ArgumentSignature::new("string", true))
                    .with_output("string"),
            ),
        );
        assert_eq!(hub.services().collect::<Vec<_>>(), vec!["alpine"]);
        assert_eq!(
            hub.lookup("alpine").unwrap().command("echo").unwrap().output_type(),
            Type::String
        );
    }
}
