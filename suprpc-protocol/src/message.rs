//! Request and response envelopes.

use crate::error::FaultCode;
use crate::value::Value;
use serde::Serialize;
use std::fmt;

/// Struct member carrying the numeric fault code.
pub const FAULT_CODE_MEMBER: &str = "faultCode";

/// Struct member carrying the human-readable fault message.
pub const FAULT_STRING_MEMBER: &str = "faultString";

/// An XML-RPC `methodCall`: a method name and positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method_name: String,
    pub params: Vec<Value>,
}

impl MethodCall {
    pub fn new(method_name: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }

    /// Appends one positional parameter.
    pub fn arg(mut self, param: impl Into<Value>) -> Self {
        self.params.push(param.into());
        self
    }
}

/// A remote fault: the daemon understood the call and rejected it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fault {
    pub code: i32,
    pub message: String,
}

impl Fault {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Recognizes the fault signature: a struct with exactly an integer
    /// `faultCode` and a string `faultString`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let members = value.as_struct()?;
        if members.len() != 2 {
            return None;
        }
        let code = members.get(FAULT_CODE_MEMBER)?.as_i32()?;
        let message = members.get(FAULT_STRING_MEMBER)?.as_str()?;
        Some(Self::new(code, message))
    }

    /// Converts this fault back into its struct form.
    pub fn to_value(&self) -> Value {
        Value::structure([
            (FAULT_CODE_MEMBER, Value::Int(self.code)),
            (FAULT_STRING_MEMBER, Value::String(self.message.clone())),
        ])
    }

    /// Returns the known supervisord fault this code maps to, if any.
    pub fn fault_code(&self) -> Option<FaultCode> {
        FaultCode::from_code(self.code)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A decoded `methodResponse`. Exactly one of a result value or a fault.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Success(Value),
    Fault(Fault),
}

impl Response {
    pub fn ok(value: impl Into<Value>) -> Self {
        Response::Success(value.into())
    }

    pub fn fault(code: i32, message: impl Into<String>) -> Self {
        Response::Fault(Fault::new(code, message))
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Response::Fault(_))
    }

    /// Splits the response into a `Result`. A success value that carries the
    /// fault signature is treated as a fault.
    pub fn into_result(self) -> Result<Value, Fault> {
        match self {
            Response::Success(value) => match Fault::from_value(&value) {
                Some(fault) => Err(fault),
                None => Ok(value),
            },
            Response::Fault(fault) => Err(fault),
        }
    }
}
