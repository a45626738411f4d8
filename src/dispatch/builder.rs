// ABOUTME: Builder for dispatch sequencers with pacing, recipient cap and byte limit options
// ABOUTME: Lets callers swap in a custom pacer, e.g. a no-op one for tests

use crate::config::EngineConfig;
use crate::datatypes::Classifier;
use crate::dispatch::pacing::{Pacer, TokioPacer};
use crate::dispatch::sequencer::{DispatchSequencer, SequencerOptions};
use crate::dispatch::traits::SmsGateway;
use std::time::Duration;

/// Fluent construction of a [`DispatchSequencer`]
///
/// ```rust
/// use sms_dispatch::dispatch::{NoDelay, SequencerBuilder};
/// # use sms_dispatch::dispatch::{GatewayResult, SendMeta, SmsGateway};
/// # use sms_dispatch::datatypes::Recipient;
/// # struct Gateway;
/// # impl SmsGateway for Gateway {
/// #     async fn send(&mut self, _: &str, _: &[Recipient], _: &SendMeta) -> GatewayResult<String> {
/// #         Ok("id".to_string())
/// #     }
/// # }
/// use std::time::Duration;
///
/// let sequencer = SequencerBuilder::new(Gateway)
///     .pacer(NoDelay)
///     .inter_page_delay(Duration::from_millis(250))
///     .max_recipients(200)
///     .build();
///
/// assert_eq!(sequencer.options().max_recipients, 200);
/// ```
#[derive(Debug)]
pub struct SequencerBuilder<G, P = TokioPacer> {
    gateway: G,
    pacer: P,
    options: SequencerOptions,
}

impl<G> SequencerBuilder<G, TokioPacer>
where
    G: SmsGateway,
{
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            pacer: TokioPacer,
            options: SequencerOptions::default(),
        }
    }

    /// Builder preloaded with the dispatch and limit sections of `config`
    pub fn from_config(gateway: G, config: &EngineConfig) -> Self {
        Self::new(gateway).options(config.sequencer_options())
    }
}

impl<G, P> SequencerBuilder<G, P>
where
    G: SmsGateway,
    P: Pacer,
{
    /// Replace the pacer
    pub fn pacer<Q: Pacer>(self, pacer: Q) -> SequencerBuilder<G, Q> {
        SequencerBuilder {
            gateway: self.gateway,
            pacer,
            options: self.options,
        }
    }

    /// Replace all options at once
    pub fn options(mut self, options: SequencerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn inter_page_delay(mut self, delay: Duration) -> Self {
        self.options.inter_page_delay = delay;
        self
    }

    pub fn max_recipients(mut self, max: usize) -> Self {
        self.options.max_recipients = max;
        self
    }

    pub fn classifier(mut self, classifier: Classifier) -> Self {
        self.options.classifier = classifier;
        self
    }

    pub fn build(self) -> DispatchSequencer<G, P> {
        DispatchSequencer::with_parts(self.gateway, self.pacer, self.options)
    }
}
