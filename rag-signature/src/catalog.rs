//! Signatures of the pipeline's call-sites.
//!
//! Field descriptions are prompt text: they reach the model verbatim.

use crate::field::{FieldKind, FieldSpec};
use crate::signature::Signature;
use serde_json::json;

fn text(name: &str, description: &str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Str).describe(description)
}

fn query() -> FieldSpec {
    text("query", "The user's query.")
}

/// Answer a question from retrieved context.
pub fn context_question() -> Signature {
    Signature::new("context_question")
        .instructions(
            "Answer the question using only the information in the context. \
             If the context does not contain the answer, say so plainly.",
        )
        .input(text(
            "context",
            "Passages retrieved from the knowledge base that may contain the answer.",
        ))
        .input(text("question", "The question to answer."))
        .output(text(
            "answer",
            "A concise answer grounded in the context, without speculation.",
        ))
}

/// Pick the API endpoints relevant to a query.
pub fn array_answer() -> Signature {
    Signature::new("array_answer")
        .instructions("Select the API endpoints needed to fulfil the query.")
        .input(query())
        .input(
            FieldSpec::new("endpoints", FieldKind::str_list())
                .describe("Documentation of every available endpoint, one entry per endpoint."),
        )
        .output(
            FieldSpec::new("relevant_endpoints", FieldKind::str_list())
                .describe(
                    "The endpoints, copied exactly from the input, that must be called to \
                     fulfil the query, in calling order. Return [] if none apply.",
                )
                .default_value(json!([])),
        )
}

/// Rewrite a follow-up query so it stands on its own.
pub fn query_rephrase() -> Signature {
    Signature::new("query_rephrase")
        .instructions(
            "Rephrase the query into a standalone question using the conversation history.",
        )
        .input(query())
        .input(
            FieldSpec::new("history", FieldKind::str_list())
                .describe("Previous turns of the conversation, oldest first."),
        )
        .output(text(
            "rephrased_query",
            "The query rewritten to be understandable without the history: resolve pronouns \
             and references. Return the query unchanged if it is already standalone.",
        ))
}

/// Write the final answer from retrieved context.
pub fn generate_response() -> Signature {
    Signature::new("generate_response")
        .instructions("Write a helpful response to the query based on the context.")
        .input(query())
        .input(text("context", "Information retrieved for the query."))
        .output(text(
            "response",
            "A clear, well-structured response for the end user. Use Markdown where it helps \
             readability. Do not mention the context itself.",
        ))
}

/// Write a program that computes the answer to a query.
pub fn compute_query() -> Signature {
    Signature::new("compute_query")
        .instructions(
            "Write a Python program that computes the answer to the query from the available data.",
        )
        .input(query())
        .input(text(
            "context",
            "The data available to the program: table file names, their columns and sample rows.",
        ))
        .output(text(
            "code",
            "A self-contained Python program that prints the answer. Output only code, \
             without Markdown fences or explanations.",
        ))
}

/// Answer a query from the output of generated code.
pub fn generate_response_using_code_output() -> Signature {
    Signature::new("generate_response_using_code_output")
        .instructions("Answer the query using the output of the program written for it.")
        .input(query())
        .input(text("code", "The program that was executed."))
        .input(text("code_output", "What the program printed."))
        .output(text(
            "response",
            "A response to the query that states the computed result in plain language.",
        ))
}

/// Answer a query when no code output is available.
pub fn generate_response_without_code_output() -> Signature {
    Signature::new("generate_response_without_code_output")
        .instructions("Answer the query as well as possible without computing anything.")
        .input(query())
        .input(text("context", "Information retrieved for the query."))
        .output(text(
            "response",
            "A response to the query. If the answer needs a computation that could not be \
             performed, explain what is missing.",
        ))
}

/// Extract request parameters and body from a query.
pub fn request_schema_generator() -> Signature {
    Signature::new("request_schema_generator")
        .instructions(
            "Extract the request parameters and request body for an API call from the query.",
        )
        .input(text(
            "request_parameters_schema",
            "Define the parameters required for the request as a query. Use this schema \
             specifically to extract and structure the request parameters content in the \
             final output.",
        ))
        .input(text(
            "request_body_schema",
            "Provide the schema for the request body. This will be used to extract and \
             structure only the request body content in the final output.",
        ))
        .input(text(
            "query",
            "The input query from which the request parameters and request body will be \
             extracted. Ensure that all relevant details for both are captured accurately.",
        ))
        .output(
            FieldSpec::new("request_parameters", FieldKind::Json)
                .describe(
                    "A JSON object containing ONLY request parameters that are EXPLICITLY \
                     mentioned in the user's query. Return an empty dict {} if no specific \
                     parameter values are mentioned. DO NOT add optional parameters like \
                     'expand', 'limit', or others unless the user specifically asks for them. \
                     When in doubt, return empty {}.",
                )
                .default_value(json!({})),
        )
        .output(
            FieldSpec::new("request_body", FieldKind::Json)
                .describe(
                    "A JSON object containing ONLY request body fields that are EXPLICITLY \
                     mentioned in the user's query. Return an empty dict {} if no specific \
                     values are provided. DO NOT guess or infer values. When in doubt, \
                     return empty {}.",
                )
                .default_value(json!({})),
        )
}

/// Suggest follow-up questions.
pub fn follow_up() -> Signature {
    Signature::new("follow_up")
        .instructions("Suggest follow-up questions the user is likely to ask next.")
        .input(query())
        .input(text("response", "The response the user received."))
        .output(
            FieldSpec::new("follow_up_questions", FieldKind::str_list())
                .describe("Three short follow-up questions, each answerable by the same system.")
                .default_value(json!([])),
        )
}

/// Decide how a query should be handled.
pub fn query_action() -> Signature {
    Signature::new("query_action")
        .instructions("Decide how the query should be handled.")
        .input(query())
        .output(text(
            "action",
            "Exactly one word: `compute` if answering requires calculations, aggregation or \
             filtering over tabular data; otherwise `answer`.",
        ))
}

/// Every catalog signature.
pub fn all() -> Vec<Signature> {
    vec![
        context_question(),
        array_answer(),
        query_rephrase(),
        generate_response(),
        compute_query(),
        generate_response_using_code_output(),
        generate_response_without_code_output(),
        request_schema_generator(),
        follow_up(),
        query_action(),
    ]
}
