// Component metadata: roles, parameter bindings, name derivation

/// Role a component plays in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentRole {
    /// Routed component; bean name is the lower-cased simple type name.
    Controller,
    /// Wired component; bean name is explicit or one per exposed interface.
    Service,
    /// Known to the scanner but never instantiated.
    Other,
}

/// How a single handler parameter is bound at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamBinding {
    /// The request context itself.
    Context,
    /// The response sink itself.
    Sink,
    /// A string value from the request parameter bag.
    Str,
    /// An integer value parsed from the request parameter bag.
    Int,
}

impl ParamBinding {
    pub fn is_scalar(&self) -> bool {
        matches!(self, ParamBinding::Str | ParamBinding::Int)
    }
}

/// One parameter of a routed method, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: &'static str,
    pub binding: ParamBinding,
}

/// A scalar argument bound from the parameter bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarValue {
    Str(String),
    Int(i64),
}

/// Strips the `dyn ` prefix `std::any::type_name` puts on trait objects, so
/// interface bean names and injection targets key on the same string.
pub const fn qualified_name(raw: &'static str) -> &'static str {
    let bytes = raw.as_bytes();
    if bytes.len() >= 4
        && bytes[0] == b'd'
        && bytes[1] == b'y'
        && bytes[2] == b'n'
        && bytes[3] == b' '
    {
        let (_, rest) = raw.split_at(4);
        rest
    } else {
        raw
    }
}

/// The last `::` segment of a qualified type name.
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit("::").next().unwrap_or(qualified)
}

/// Default bean name for a controller type: simple name, first letter
/// lower-cased.
pub fn bean_name_for_type(type_name: &str) -> String {
    let simple = simple_name(type_name);
    let mut chars = simple.chars();
    match chars.next() {
        Some(first) => {
            let mut name = String::with_capacity(simple.len());
            name.extend(first.to_lowercase());
            name.push_str(chars.as_str());
            name
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_name_takes_last_segment() {
        assert_eq!(simple_name("app::web::DemoController"), "DemoController");
        assert_eq!(simple_name("DemoController"), "DemoController");
    }

    #[test]
    fn bean_name_lowercases_first_letter() {
        assert_eq!(bean_name_for_type("app::web::DemoController"), "demoController");
        assert_eq!(bean_name_for_type("X"), "x");
        assert_eq!(bean_name_for_type(""), "");
    }

    #[test]
    fn qualified_name_strips_dyn_prefix() {
        assert_eq!(qualified_name("dyn app::svc::IGreeter"), "app::svc::IGreeter");
        assert_eq!(qualified_name("app::svc::Greeter"), "app::svc::Greeter");
    }

    #[test]
    fn scalar_bindings_are_flagged() {
        assert!(ParamBinding::Str.is_scalar());
        assert!(ParamBinding::Int.is_scalar());
        assert!(!ParamBinding::Context.is_scalar());
        assert!(!ParamBinding::Sink.is_scalar());
    }
}
