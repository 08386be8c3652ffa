//! Functions callable from documents.
//!
//! A [`Function`] is a static descriptor: an ordered parameter table built
//! with [`FunctionBuilder`], validators, and an invocation closure. Binding
//! supplied arguments against the table is done by [`binding::bind`].

pub mod binding;
pub mod call;

use crate::context::Context;
use crate::error::Result;
use crate::pipeline::PipelineHooks;
use crate::value::{EnumSpec, Lambda, Range, Size, Value};
use std::fmt;
use std::rc::Rc;

pub use binding::bind;
pub use call::{evaluate_all, evaluate_calls, invoke, plain_text_of, to_node, FunctionCall, FunctionCallArgument};

/// Declared type of a parameter, selecting its converter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamType {
    /// Evaluated value, unconverted
    Dynamic,
    String,
    Number,
    Integer,
    Boolean,
    Enum(&'static EnumSpec),
    Size,
    Range,
    Iterable,
    Dictionary,
    InlineMarkup,
    BlockMarkup,
    Lambda,
}

impl ParamType {
    pub fn name(&self) -> &'static str {
        match self {
            ParamType::Dynamic => "dynamic",
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
            ParamType::Enum(spec) => spec.name,
            ParamType::Size => "size",
            ParamType::Range => "range",
            ParamType::Iterable => "iterable",
            ParamType::Dictionary => "dictionary",
            ParamType::InlineMarkup => "inline markup",
            ParamType::BlockMarkup => "block markup",
            ParamType::Lambda => "lambda",
        }
    }
}

/// Fills an injected parameter from ambient state
pub type Injector = fn(&Context, &FunctionCall) -> Value;

/// Rejects a call for contextual reasons, returning the reason
pub type Validator = Rc<dyn Fn(&Context, &FunctionCall) -> std::result::Result<(), String>>;

pub type Invoke = Rc<dyn Fn(&mut CallEnv<'_>, &BoundArguments) -> Result<Value>>;

#[derive(Debug, Clone)]
pub struct FunctionParameter {
    pub name: String,
    pub ty: ParamType,
    pub index: usize,
    pub optional: bool,
    pub nullable: bool,
    pub injected: Option<Injector>,
    pub default: Option<Value>,
}

/// Environment handed to an invocation
pub struct CallEnv<'a> {
    pub ctx: &'a mut Context,
    pub call: &'a FunctionCall,
}

#[derive(Clone)]
pub struct Function {
    pub name: String,
    pub parameters: Vec<FunctionParameter>,
    pub validators: Vec<Validator>,
    pub invoke: Invoke,
}

impl Function {
    pub fn builder(name: impl Into<String>) -> FunctionBuilder {
        FunctionBuilder {
            name: name.into(),
            parameters: Vec::new(),
            validators: Vec::new(),
        }
    }

    /// A parameterless function returning `value`, used for variables and
    /// lambda parameters
    pub fn constant(name: impl Into<String>, value: Value) -> Self {
        Function::builder(name).build(move |_, _| Ok(value.clone()))
    }

    pub fn parameter(&self, name: &str) -> Option<&FunctionParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("validators", &self.validators.len())
            .finish()
    }
}

pub struct FunctionBuilder {
    name: String,
    parameters: Vec<FunctionParameter>,
    validators: Vec<Validator>,
}

impl FunctionBuilder {
    fn push(mut self, name: &str, ty: ParamType, configure: impl FnOnce(&mut FunctionParameter)) -> Self {
        let mut parameter = FunctionParameter {
            name: name.to_string(),
            ty,
            index: self.parameters.len(),
            optional: false,
            nullable: false,
            injected: None,
            default: None,
        };
        configure(&mut parameter);
        self.parameters.push(parameter);
        self
    }

    /// Required parameter
    pub fn param(self, name: &str, ty: ParamType) -> Self {
        self.push(name, ty, |_| {})
    }

    /// Optional parameter taking `default` when omitted
    pub fn optional(self, name: &str, ty: ParamType, default: impl Into<Value>) -> Self {
        let default = default.into();
        self.push(name, ty, |p| {
            p.optional = true;
            p.default = Some(default);
        })
    }

    /// Optional parameter that is [`Value::None`] when omitted
    pub fn nullable(self, name: &str, ty: ParamType) -> Self {
        self.push(name, ty, |p| {
            p.optional = true;
            p.nullable = true;
        })
    }

    /// Parameter filled by the engine, never by the caller
    pub fn injected(self, name: &str, ty: ParamType, injector: Injector) -> Self {
        self.push(name, ty, |p| p.injected = Some(injector))
    }

    pub fn validate(
        mut self,
        validator: impl Fn(&Context, &FunctionCall) -> std::result::Result<(), String> + 'static,
    ) -> Self {
        self.validators.push(Rc::new(validator));
        self
    }

    pub fn build(
        self,
        invoke: impl Fn(&mut CallEnv<'_>, &BoundArguments) -> Result<Value> + 'static,
    ) -> Function {
        Function {
            name: self.name,
            parameters: self.parameters,
            validators: self.validators,
            invoke: Rc::new(invoke),
        }
    }
}

/// Converted argument values, by parameter name
#[derive(Debug, Clone, Default)]
pub struct BoundArguments {
    values: Vec<(String, Value)>,
}

impl BoundArguments {
    pub fn new(values: Vec<(String, Value)>) -> Self {
        Self { values }
    }

    /// Value bound to `name`; [`Value::None`] for unknown names
    pub fn get(&self, name: &str) -> &Value {
        const NONE: &Value = &Value::None;
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .unwrap_or(NONE)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().map(|(_, v)| v)
    }

    pub fn string(&self, name: &str) -> Option<String> {
        match self.get(name) {
            Value::None => None,
            value => Some(value.to_string()),
        }
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).as_number()
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.number(name).map(|n| n as i64)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn size(&self, name: &str) -> Option<Size> {
        match self.get(name) {
            Value::Size(size) => Some(*size),
            _ => None,
        }
    }

    pub fn range(&self, name: &str) -> Option<Range> {
        match self.get(name) {
            Value::Range(range) => Some(*range),
            _ => None,
        }
    }

    pub fn items(&self, name: &str) -> Vec<Value> {
        match self.get(name) {
            Value::Iterable(items) => items.clone(),
            _ => Vec::new(),
        }
    }

    pub fn lambda(&self, name: &str) -> Option<Rc<Lambda>> {
        match self.get(name) {
            Value::Lambda(lambda) => Some(lambda.clone()),
            _ => None,
        }
    }
}

/// A named bundle of functions
#[derive(Clone)]
pub struct Library {
    pub name: String,
    pub functions: Vec<Function>,
    pub on_load: Option<Rc<dyn Fn(&mut Context) -> Result<()>>>,
    pub hooks: Option<PipelineHooks>,
}

impl Library {
    pub fn new(name: impl Into<String>, functions: Vec<Function>) -> Self {
        Self {
            name: name.into(),
            functions,
            on_load: None,
            hooks: None,
        }
    }

    pub fn with_on_load(mut self, on_load: impl Fn(&mut Context) -> Result<()> + 'static) -> Self {
        self.on_load = Some(Rc::new(on_load));
        self
    }

    pub fn with_hooks(mut self, hooks: PipelineHooks) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.functions.iter().map(|f| f.name.as_str()).collect();
        f.debug_struct("Library")
            .field("name", &self.name)
            .field("functions", &names)
            .field("on_load", &self.on_load.is_some())
            .finish()
    }
}
