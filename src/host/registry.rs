//! Plugin metadata and the function registry
//!
//! Every filter is exposed as a named function of a plugin namespace, with an
//! argument signature in the host convention `name:type[:opt];...`, for
//! example `clip:clip;threshold:int:opt;`.

use super::args::{Args, Value};
use super::node::Node;
use crate::error::{Error, Result};
use crate::filter;
use std::fmt;
use tracing::debug;

/// Type of a declared argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Int,
    Float,
    Data,
    Clip,
}

impl ArgKind {
    fn parse(name: &str) -> Result<Self> {
        match name {
            "int" => Ok(ArgKind::Int),
            "float" => Ok(ArgKind::Float),
            "data" => Ok(ArgKind::Data),
            "clip" => Ok(ArgKind::Clip),
            other => Err(Error::config(format!("Unknown argument type {:?}", other))),
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ArgKind::Int, Value::Int(_))
                | (ArgKind::Float, Value::Float(_))
                | (ArgKind::Float, Value::Int(_))
                | (ArgKind::Data, Value::Data(_))
                | (ArgKind::Clip, Value::Clip(_))
        )
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgKind::Int => "int",
            ArgKind::Float => "float",
            ArgKind::Data => "data",
            ArgKind::Clip => "clip",
        };
        write!(f, "{}", name)
    }
}

/// One declared argument of a function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: String,
    pub kind: ArgKind,
    pub array: bool,
    pub optional: bool,
}

impl ArgSpec {
    /// Parse a signature string into its argument declarations
    pub fn parse_signature(signature: &str) -> Result<Vec<ArgSpec>> {
        signature
            .split(';')
            .map(str::trim)
            .filter(|decl| !decl.is_empty())
            .map(|decl| {
                let mut parts = decl.split(':');
                let name = parts.next().unwrap_or_default();
                let kind = parts
                    .next()
                    .ok_or_else(|| Error::config(format!("Argument {:?} has no type", decl)))?;
                let (kind, array) = match kind.strip_suffix("[]") {
                    Some(base) => (base, true),
                    None => (kind, false),
                };
                let mut optional = false;
                for flag in parts {
                    match flag {
                        "opt" => optional = true,
                        "empty" => {}
                        other => {
                            return Err(Error::config(format!(
                                "Unknown flag {:?} on argument {}",
                                other, name
                            )))
                        }
                    }
                }
                Ok(ArgSpec {
                    name: name.to_string(),
                    kind: ArgKind::parse(kind)?,
                    array,
                    optional,
                })
            })
            .collect()
    }
}

/// Constructor invoked once the arguments match the signature
pub type CreateFn = fn(&Args) -> Result<Node>;

/// A filter function exposed by a plugin
#[derive(Clone)]
pub struct FunctionDef {
    pub name: &'static str,
    pub signature: &'static str,
    pub create: CreateFn,
}

impl FunctionDef {
    pub fn new(name: &'static str, signature: &'static str, create: CreateFn) -> Self {
        FunctionDef {
            name,
            signature,
            create,
        }
    }

    /// Check `args` against the signature, then build the node
    pub fn invoke(&self, args: &Args) -> Result<Node> {
        let specs = ArgSpec::parse_signature(self.signature)?;

        for key in args.keys() {
            if !specs.iter().any(|s| s.name == key) {
                return Err(Error::config(format!(
                    "{}: unknown argument {}",
                    self.name, key
                )));
            }
        }

        for spec in &specs {
            let values = args.get_all(&spec.name);
            if values.is_empty() {
                if spec.optional {
                    continue;
                }
                return Err(Error::config(format!(
                    "{}: argument {} is required",
                    self.name, spec.name
                )));
            }
            if !spec.array && values.len() > 1 {
                return Err(Error::config(format!(
                    "{}: argument {} takes a single value",
                    self.name, spec.name
                )));
            }
            if let Some(bad) = values.iter().find(|v| !spec.kind.accepts(v)) {
                return Err(Error::config(format!(
                    "{}: argument {} must be {}, got {}",
                    self.name,
                    spec.name,
                    spec.kind,
                    bad.type_name()
                )));
            }
        }

        (self.create)(args)
    }
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish()
    }
}

/// A plugin: an identified namespace of functions
#[derive(Debug, Clone)]
pub struct Plugin {
    /// Reverse-URL unique identifier
    pub identifier: &'static str,
    /// Namespace functions are called through
    pub namespace: &'static str,
    /// Human-readable name
    pub name: &'static str,
    pub functions: Vec<FunctionDef>,
}

/// Registered plugins
#[derive(Debug, Clone, Default)]
pub struct Registry {
    plugins: Vec<Plugin>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every filter shipped with this crate
    pub fn builtin() -> Self {
        let mut registry = Registry::new();
        registry.register(filter::dotblur::plugin());
        registry.register(filter::rainbow::plugin());
        registry.register(filter::motion::plugin());
        registry.register(filter::uncross::plugin());
        registry
    }

    pub fn register(&mut self, plugin: Plugin) {
        debug!(
            identifier = plugin.identifier,
            namespace = plugin.namespace,
            functions = plugin.functions.len(),
            "registering plugin"
        );
        self.plugins.push(plugin);
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// Look up `namespace.Function`
    pub fn find(&self, full_name: &str) -> Option<&FunctionDef> {
        let (namespace, name) = full_name.split_once('.')?;
        self.plugins
            .iter()
            .filter(|p| p.namespace == namespace)
            .flat_map(|p| p.functions.iter())
            .find(|f| f.name == name)
    }

    /// Construct the function `namespace.Function` with `args`
    pub fn invoke(&self, full_name: &str, args: &Args) -> Result<Node> {
        let function = self
            .find(full_name)
            .ok_or_else(|| Error::config(format!("No such function: {}", full_name)))?;
        function.invoke(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Clip;
    use crate::util::PixelFormat;

    #[test]
    fn test_parse_signature() {
        let specs = ArgSpec::parse_signature("clip:clip;threshold:int:opt;planes:int[]:opt:empty;").unwrap();
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0].kind, ArgKind::Clip);
        assert!(!specs[0].optional);
        assert!(specs[1].optional);
        assert!(specs[2].array);
    }

    #[test]
    fn test_parse_signature_errors() {
        assert!(ArgSpec::parse_signature("clip;").is_err());
        assert!(ArgSpec::parse_signature("clip:frame;").is_err());
        assert!(ArgSpec::parse_signature("clip:clip:sometimes;").is_err());
    }

    #[test]
    fn test_builtin_functions() {
        let registry = Registry::builtin();
        for name in [
            "dotblur.Blur",
            "rainbowdetect.Detect",
            "motiondetect.Estimate",
            "motiondetect.Compensate",
            "uncross.Filter",
        ] {
            let function = registry.find(name).unwrap();
            assert!(ArgSpec::parse_signature(function.signature).is_ok(), "{}", name);
        }
        assert!(registry.find("dotblur.Sharpen").is_none());
        assert!(registry.find("Blur").is_none());
    }

    #[test]
    fn test_invoke_checks_arguments() {
        let registry = Registry::builtin();
        let clip = Node::new(Clip::blank(PixelFormat::YUV444P8, 8, 8, 2));

        let mut args = Args::new();
        assert!(registry.invoke("dotblur.Blur", &args).is_err());

        args.set_clip("clip", clip.clone());
        args.set_int("radius", 2);
        let err = registry.invoke("dotblur.Blur", &args).unwrap_err();
        assert!(err.to_string().contains("unknown argument radius"));

        let mut args = Args::new();
        args.set_clip("clip", clip.clone());
        args.set_parsed("threshold=big").unwrap();
        assert!(registry.invoke("motiondetect.Estimate", &args).is_err());

        let mut args = Args::new();
        args.set_clip("clip", clip);
        let node = registry.invoke("uncross.Filter", &args).unwrap();
        assert_eq!(node.name(), "Uncross");
    }
}
