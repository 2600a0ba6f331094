//! Operations decorated with the timing interceptor.

use crate::interceptor::TimingInterceptor;
use call_timer_domain::CallSite;
use std::future::Future;

/// An operation bound to a call site; each call is timed and recorded.
#[derive(Debug, Clone)]
pub struct TimedOperation<F> {
    interceptor: TimingInterceptor,
    site: CallSite,
    operation: F,
}

impl<F> TimedOperation<F> {
    pub(crate) const fn new(interceptor: TimingInterceptor, site: CallSite, operation: F) -> Self {
        Self {
            interceptor,
            site,
            operation,
        }
    }

    /// Call site this operation records under.
    #[must_use]
    pub const fn site(&self) -> &CallSite {
        &self.site
    }

    /// Invoke the operation with `args` and record one sample.
    pub fn call<A, R>(&self, args: A) -> R
    where
        F: Fn(A) -> R,
    {
        self.interceptor
            .time_site(&self.site, || (self.operation)(args))
    }

    /// Invoke an async operation with `args` and record one sample once the
    /// returned future completes or is dropped.
    ///
    /// The clock starts before the operation is invoked, so synchronous work
    /// done while building the future is included.
    pub fn call_async<A, Fut>(&self, args: A) -> impl Future<Output = Fut::Output>
    where
        F: Fn(A) -> Fut,
        Fut: Future,
    {
        self.interceptor.time_async_with(
            self.site.context(),
            self.site.marker(),
            || (self.operation)(args),
        )
    }
}
