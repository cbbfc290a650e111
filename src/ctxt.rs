/*!
The [`Ctxt`] type.

A context reads the trace and span active on the calling thread when an event is mapped. The bridge never changes the active context, it only captures it.
*/

use emit::empty::Empty;

use crate::record::TraceContext;

/**
A source of the ambient trace context.
*/
pub trait Ctxt {
    /**
    Get the trace and span active on the calling thread, if there is one.
    */
    fn current(&self) -> Option<TraceContext>;
}

impl<'a, C: Ctxt + ?Sized> Ctxt for &'a C {
    fn current(&self) -> Option<TraceContext> {
        (**self).current()
    }
}

impl<'a, C: Ctxt + ?Sized + 'a> Ctxt for Box<C> {
    fn current(&self) -> Option<TraceContext> {
        (**self).current()
    }
}

impl<'a, C: Ctxt + ?Sized + 'a> Ctxt for std::sync::Arc<C> {
    fn current(&self) -> Option<TraceContext> {
        (**self).current()
    }
}

impl<C: Ctxt> Ctxt for Option<C> {
    fn current(&self) -> Option<TraceContext> {
        self.as_ref().and_then(|ctxt| ctxt.current())
    }
}

impl Ctxt for Empty {
    fn current(&self) -> Option<TraceContext> {
        None
    }
}

/**
A [`Ctxt`] from a function.

Use [`from_fn`] to create one.
*/
pub struct FromFn<F>(F);

impl<F: Fn() -> Option<TraceContext>> Ctxt for FromFn<F> {
    fn current(&self) -> Option<TraceContext> {
        (self.0)()
    }
}

/**
Create a [`Ctxt`] from a function that returns the active trace context.
*/
pub fn from_fn<F: Fn() -> Option<TraceContext>>(f: F) -> FromFn<F> {
    FromFn(f)
}

#[cfg(test)]
mod tests {
    use emit::span::{SpanId, TraceId};

    use super::*;

    #[test]
    fn from_fn_reads_current() {
        let trace_context = TraceContext {
            trace_id: TraceId::from_u128(1).unwrap(),
            span_id: SpanId::from_u64(2).unwrap(),
            trace_flags: 1,
        };

        let ctxt = from_fn(move || Some(trace_context));

        assert_eq!(Some(trace_context), ctxt.current());
        assert_eq!(None, Empty.current());
        assert_eq!(None, None::<FromFn<fn() -> Option<TraceContext>>>.current());
    }
}
