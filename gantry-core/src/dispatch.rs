// Per-request resolution, binding, and invocation

use crate::container::Container;
use crate::http::{RequestContext, ResponseSink};
use crate::metadata::{ParamBinding, ParameterDescriptor, ScalarValue};
use crate::routing::{Route, RouteTable};
use crate::Error;
use tracing::{debug, error};

/// Body written on a route-table miss.
pub const NOT_FOUND_BODY: &str = "404 Not Found!";

/// Prefix of the body written when an invocation faults; the fault's
/// diagnostic lines follow.
pub const SERVER_ERROR_PREFIX: &str = "500 Exception,Details:\r\n";

/// Resolves, binds, and invokes one request. Every outcome writes at most
/// one response through the sink; faults are logged and isolated to this
/// request, never raised to the transport.
pub(crate) fn dispatch(
    container: &Container,
    routes: &RouteTable,
    ctx: &RequestContext,
    sink: &mut ResponseSink,
) {
    if routes.is_empty() {
        return;
    }

    let Some(route) = routes.lookup(&ctx.path) else {
        let miss = Error::RouteNotFound(ctx.path.clone());
        debug!(path = %ctx.path, "{miss}");
        sink.write(NOT_FOUND_BODY);
        return;
    };

    match invoke(container, route, ctx, sink) {
        Ok(()) => {
            debug!(path = %ctx.path, handler = route.handler_name, "request handled");
        }
        Err(fault) => {
            error!(
                path = %ctx.path,
                handler = route.handler_name,
                error = %fault,
                "handler invocation faulted"
            );
            sink.write(format!("{SERVER_ERROR_PREFIX}{}", diagnostic_lines(&fault)));
        }
    }
}

fn invoke(
    container: &Container,
    route: &Route,
    ctx: &RequestContext,
    sink: &mut ResponseSink,
) -> Result<(), Error> {
    let bean = container.get(&route.bean_name).ok_or_else(|| {
        Error::Dispatch(format!(
            "no bean `{}` for controller {}",
            route.bean_name, route.controller
        ))
    })?;
    let scalars = bind_scalars(&route.params, ctx)?;
    (route.invoke)(bean, ctx, sink, &scalars)
}

/// Binds the scalar parameters of a route, in declared order, by precise
/// name lookup in the request's parameter bag. Multiple values under one
/// name are joined with `,` before coercion, so a multi-valued integer
/// still fails to parse.
fn bind_scalars(
    params: &[ParameterDescriptor],
    ctx: &RequestContext,
) -> Result<Vec<ScalarValue>, Error> {
    params
        .iter()
        .filter(|param| param.binding.is_scalar())
        .map(|param| {
            let values = ctx.values(param.name).ok_or_else(|| {
                Error::Binding(format!("missing request parameter `{}`", param.name))
            })?;
            let joined = values.join(",");
            match param.binding {
                ParamBinding::Str => Ok(ScalarValue::Str(joined)),
                ParamBinding::Int => joined.parse::<i64>().map(ScalarValue::Int).map_err(|_| {
                    Error::Binding(format!(
                        "parameter `{}` is not an integer: `{joined}`",
                        param.name
                    ))
                }),
                ParamBinding::Context | ParamBinding::Sink => {
                    unreachable!("non-scalar bindings are filtered out")
                }
            }
        })
        .collect()
}

fn diagnostic_lines(fault: &Error) -> String {
    let mut lines = vec![fault.to_string()];
    let mut source = std::error::Error::source(fault);
    while let Some(cause) = source {
        lines.push(cause.to_string());
        source = cause.source();
    }
    lines.join("\r\n")
}
