//! The registry of logged call-sites.

use crate::logger::CallLogger;
use crate::predictor::LoggedPredictor;
use rag_lm::Lm;
use rag_signature::catalog;
use rag_turn::Provider;
use std::sync::Arc;

/// Fixed names every call-site logs under.
pub mod names {
    /// Answer from retrieved context.
    pub const ANSWER_FROM_CONTEXT: &str = "agent basic";
    /// Pick relevant API endpoints.
    pub const ENDPOINT_FILTER: &str = "agent filterer";
    /// Rephrase against the conversation history.
    pub const REPHRASER: &str = "agent rephraser";
    /// Write a response from context.
    pub const RESPONSE_GENERATOR: &str = "response generator";
    /// Write code that computes the answer.
    pub const CODE_GENERATOR: &str = "code gen agent";
    /// Answer from code output.
    pub const RESPONSE_WITH_CODE_OUTPUT: &str = "generate response using code ouptut";
    /// Answer without code output.
    pub const RESPONSE_WITHOUT_CODE_OUTPUT: &str = "generate response without code ouptut";
    /// Extract request parameters and body.
    pub const REQUEST_GENERATOR: &str = "agent request generator";
    /// Suggest follow-up questions.
    pub const FOLLOW_UP: &str = "follow up questions generator";
    /// Decide between computing and answering.
    pub const ACTION_DECIDER: &str = "action decider agent";

    /// Every name, in registry order.
    pub const ALL: [&str; 10] = [
        ANSWER_FROM_CONTEXT,
        ENDPOINT_FILTER,
        REPHRASER,
        RESPONSE_GENERATOR,
        CODE_GENERATOR,
        RESPONSE_WITH_CODE_OUTPUT,
        RESPONSE_WITHOUT_CODE_OUTPUT,
        REQUEST_GENERATOR,
        FOLLOW_UP,
        ACTION_DECIDER,
    ];
}

/// One logged call-site per catalog signature, sharing an LM and a logger.
pub struct AgentSuite<P: Provider> {
    /// `agent basic`: context question answering.
    pub answer_from_context: LoggedPredictor<P>,
    /// `agent filterer`: endpoint selection.
    pub endpoint_array_generator: LoggedPredictor<P>,
    /// `agent rephraser`: standalone query rewriting.
    pub query_rephrase: LoggedPredictor<P>,
    /// `response generator`.
    pub generate_response: LoggedPredictor<P>,
    /// `code gen agent`.
    pub code_generator: LoggedPredictor<P>,
    /// `generate response using code ouptut`.
    pub generate_response_using_code_output: LoggedPredictor<P>,
    /// `generate response without code ouptut`.
    pub generate_response_without_code_output: LoggedPredictor<P>,
    /// `agent request generator`.
    pub generate_request: LoggedPredictor<P>,
    /// `follow up questions generator`.
    pub follow_up_questions: LoggedPredictor<P>,
    /// `action decider agent`.
    pub query_action: LoggedPredictor<P>,
    lm: Arc<Lm<P>>,
    logger: Arc<CallLogger>,
}

impl<P: Provider> AgentSuite<P> {
    /// Build every call-site over `lm`, logging into `logger`.
    pub fn new(lm: Arc<Lm<P>>, logger: Arc<CallLogger>) -> Self {
        let site = |name: &str, signature| {
            LoggedPredictor::new(name, signature, lm.clone(), logger.clone())
        };
        Self {
            answer_from_context: site(names::ANSWER_FROM_CONTEXT, catalog::context_question()),
            endpoint_array_generator: site(names::ENDPOINT_FILTER, catalog::array_answer()),
            query_rephrase: site(names::REPHRASER, catalog::query_rephrase()),
            generate_response: site(names::RESPONSE_GENERATOR, catalog::generate_response()),
            code_generator: site(names::CODE_GENERATOR, catalog::compute_query()),
            generate_response_using_code_output: site(
                names::RESPONSE_WITH_CODE_OUTPUT,
                catalog::generate_response_using_code_output(),
            ),
            generate_response_without_code_output: site(
                names::RESPONSE_WITHOUT_CODE_OUTPUT,
                catalog::generate_response_without_code_output(),
            ),
            generate_request: site(names::REQUEST_GENERATOR, catalog::request_schema_generator()),
            follow_up_questions: site(names::FOLLOW_UP, catalog::follow_up()),
            query_action: site(names::ACTION_DECIDER, catalog::query_action()),
            lm,
            logger,
        }
    }

    /// The shared LM.
    pub fn lm(&self) -> &Arc<Lm<P>> {
        &self.lm
    }

    /// The shared logger.
    pub fn logger(&self) -> &Arc<CallLogger> {
        &self.logger
    }

    /// Every call-site, in registry order.
    pub fn predictors(&self) -> [&LoggedPredictor<P>; 10] {
        [
            &self.answer_from_context,
            &self.endpoint_array_generator,
            &self.query_rephrase,
            &self.generate_response,
            &self.code_generator,
            &self.generate_response_using_code_output,
            &self.generate_response_without_code_output,
            &self.generate_request,
            &self.follow_up_questions,
            &self.query_action,
        ]
    }

    /// Look up a call-site by its logged name.
    pub fn get(&self, name: &str) -> Option<&LoggedPredictor<P>> {
        self.predictors().into_iter().find(|p| p.name() == name)
    }
}
