//! Hardware back button.
//!
//! The shell keeps at most one listener registered between `Subscribe` and
//! `Unsubscribe` and forwards presses as `Event::BackPressed`. Whenever the
//! core does not consume a press it answers with `FallThrough`, and the shell
//! runs the platform default (usually leaving the app).

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackHandlerOperation {
    Subscribe,
    Unsubscribe,
    FallThrough,
}

impl Operation for BackHandlerOperation {
    type Output = ();
}

pub struct BackHandler<E> {
    context: CapabilityContext<BackHandlerOperation, E>,
}

impl<Ev> Capability<Ev> for BackHandler<Ev> {
    type Operation = BackHandlerOperation;
    type MappedSelf<MappedEv> = BackHandler<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        BackHandler::new(self.context.map_event(f))
    }
}

impl<E> BackHandler<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<BackHandlerOperation, E>) -> Self {
        Self { context }
    }

    pub fn subscribe(&self) {
        self.notify(BackHandlerOperation::Subscribe);
    }

    pub fn unsubscribe(&self) {
        self.notify(BackHandlerOperation::Unsubscribe);
    }

    pub fn fall_through(&self) {
        self.notify(BackHandlerOperation::FallThrough);
    }

    fn notify(&self, operation: BackHandlerOperation) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(operation).await;
        });
    }
}
