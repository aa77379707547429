use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformOperation {
    /// Hand a URL to the OS (maps app, browser). Nothing is read back besides success.
    OpenUrl { url: String },
}

impl Operation for PlatformOperation {
    type Output = PlatformOutput;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformOutput {
    Opened,
    Failed { reason: String },
}

pub struct Platform<Ev> {
    context: CapabilityContext<PlatformOperation, Ev>,
}

impl<Ev> Clone for Platform<Ev> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for Platform<Ev> {
    type Operation = PlatformOperation;
    type MappedSelf<MappedEv> = Platform<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Platform::new(self.context.map_event(f))
    }
}

impl<Ev> Platform<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<PlatformOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn open_url<F>(&self, url: impl Into<String>, make_event: F)
    where
        F: FnOnce(PlatformOutput) -> Ev + Send + 'static,
    {
        let operation = PlatformOperation::OpenUrl { url: url.into() };
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx.request_from_shell(operation).await;
            ctx.update_app(make_event(output));
        });
    }
}
