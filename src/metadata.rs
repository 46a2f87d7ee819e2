//! # Call Metadata
//!
//! What the interception layer knows about a call before it runs: who declares
//! the member, what it is called, the arguments it got, the receiver (if any),
//! the declared return type and the markers that caused it to be wrapped.
//!
//! Metadata is plain data. It is built once per call and never changed while
//! the call is in flight.

use std::borrow::Cow;
use std::fmt::Debug;

/// Metadata describing one intercepted call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallMetadata {
    type_name: Cow<'static, str>,
    member_name: Cow<'static, str>,
    args: Vec<String>,
    instance: Option<String>,
    return_type: &'static str,
    triggers: Vec<Cow<'static, str>>,
}

impl CallMetadata {
    pub fn new(
        type_name: impl Into<Cow<'static, str>>,
        member_name: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            member_name: member_name.into(),
            args: Vec::new(),
            instance: None,
            return_type: "()",
            triggers: Vec::new(),
        }
    }

    /// Records one argument using its `Debug` rendering.
    pub fn with_arg(mut self, arg: &dyn Debug) -> Self {
        self.args.push(format!("{arg:?}"));
        self
    }

    /// Replaces the argument list with already rendered values.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Records the receiver of an instance call.
    pub fn with_instance(mut self, instance: &dyn Debug) -> Self {
        self.instance = Some(format!("{instance:?}"));
        self
    }

    /// Records the declared return type.
    pub fn returns<T: ?Sized>(mut self) -> Self {
        self.return_type = std::any::type_name::<T>();
        self
    }

    /// Records a marker that routed this call into the wrapper.
    pub fn with_trigger(mut self, trigger: impl Into<Cow<'static, str>>) -> Self {
        self.triggers.push(trigger.into());
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// `None` for static (receiver-less) calls.
    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    pub fn return_type(&self) -> &'static str {
        self.return_type
    }

    pub fn triggers(&self) -> impl Iterator<Item = &str> {
        self.triggers.iter().map(|t| t.as_ref())
    }
}

/// Builds a [`CallMetadata`] from a `Type::member` path.
///
/// ```rust
/// use aspect_logging::call_metadata;
///
/// let meta = call_metadata!(Calculator::add);
/// assert_eq!(meta.type_name(), "Calculator");
/// assert_eq!(meta.member_name(), "add");
/// ```
#[macro_export]
macro_rules! call_metadata {
    ($ty:ident :: $member:ident) => {
        $crate::CallMetadata::new(stringify!($ty), stringify!($member))
    };
}
