//! Decision sources for the command line

use crate::report::{print_event, OutputFormat};
use encounter_core::session::DecisionSource;
use encounter_core::{DecisionRequest, DecisionResponse, EncounterError, SessionEvent};
use std::io::{BufRead, Write};

/// Asks the player on stdin, re-asking until the answer parses
pub struct PromptSource<R> {
    input: R,
}

impl<R: BufRead> PromptSource<R> {
    pub fn new(input: R) -> Self {
        PromptSource { input }
    }
}

impl<R: BufRead> DecisionSource for PromptSource<R> {
    fn decide(&mut self, request: &DecisionRequest) -> Option<DecisionResponse> {
        loop {
            print!("{} [{}]: ", request, request.options());
            // A failed flush only delays the prompt text
            let _ = std::io::stdout().flush();

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(%err, "failed to read decision");
                    return None;
                }
            }
            match request.parse(&line) {
                Ok(response) => return Some(response),
                Err(err) => println!("{}", err),
            }
        }
    }

    fn rejected(&mut self, _request: &DecisionRequest, error: &EncounterError) {
        println!("{}", error);
    }
}

/// Prints every observed event before handing it to the inner source
pub struct Narrated<S> {
    inner: S,
    format: OutputFormat,
}

impl<S: DecisionSource> Narrated<S> {
    pub fn new(inner: S, format: OutputFormat) -> Self {
        Narrated { inner, format }
    }
}

impl<S: DecisionSource> DecisionSource for Narrated<S> {
    fn decide(&mut self, request: &DecisionRequest) -> Option<DecisionResponse> {
        let response = self.inner.decide(request);
        if let Some(response) = &response {
            tracing::debug!(%request, %response, "decision");
        }
        response
    }

    fn observe(&mut self, event: &SessionEvent) {
        print_event(self.format, event);
        self.inner.observe(event);
    }

    fn rejected(&mut self, request: &DecisionRequest, error: &EncounterError) {
        self.inner.rejected(request, error);
    }
}
