use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::timeout;

use crate::{
    core::{agent::Agent, memory::AgentMemory, steps::AgentStep},
    error::{AgentError, Result},
    services::chat_client::ChatCompletionRequest,
};

/// Arguments expected from a `final_answer` tool call
#[derive(Debug, Deserialize)]
struct FinalAnswerArguments {
    answer: String,
}

/// Synthetic tool the model must call to conclude the run
fn final_answer_tool_definition() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": "final_answer",
            "description": "Signal that the agent has completed the task by providing the final answer.",
            "parameters": {
                "type": "object",
                "properties": {
                    "answer": {
                        "type": "string",
                        "description": "Final response for the user"
                    }
                },
                "required": ["answer"]
            }
        }
    })
}

fn extract_tool_call_id(tool_call: &Value) -> &str {
    tool_call
        .get("id")
        .and_then(|value| value.as_str())
        .unwrap_or_default()
}

fn extract_function_name(tool_call: &Value) -> Option<String> {
    tool_call
        .get("function")
        .and_then(|function| function.get("name"))
        .and_then(|value| value.as_str())
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string())
}

fn parse_function_arguments(tool_call: &Value, function_name: &str) -> Result<Value> {
    let arguments_str = tool_call
        .get("function")
        .and_then(|function| function.get("arguments"))
        .and_then(|value| value.as_str())
        .unwrap_or("");

    if arguments_str.is_empty() {
        return Ok(json!({}));
    }

    serde_json::from_str(arguments_str).map_err(|err| {
        AgentError::InvalidFunctionCall(format!(
            "Failed to parse arguments for tool '{}': {}",
            function_name, err
        ))
    })
}

impl Agent {
    /// Drive the tool-call loop for one prompt until the model concludes
    /// via `final_answer` or the iteration budget runs out.
    pub async fn run(&self, prompt: &str) -> Result<String> {
        let mut memory = AgentMemory::new(Some(self.instructions().to_string()));
        memory.add_step(AgentStep::Task {
            content: prompt.to_string(),
        });

        let mut iteration = 0;

        while iteration < self.max_iterations() {
            iteration += 1;

            let messages = memory.as_messages();

            let mut tools = self.function_factory().get_openai_tools();
            tools.push(final_answer_tool_definition());

            let request_body = ChatCompletionRequest::new(self.model().to_owned(), messages)
                .with_max_tokens(self.max_tokens())
                .with_tools(tools)
                .with_tool_choice(json!("auto"))
                .into_value();

            let response = timeout(self.timeout(), self.make_raw_request(&request_body))
                .await
                .map_err(|_| AgentError::Timeout("Completion API call timed out".to_string()))??;

            let assistant_message = response
                .get("choices")
                .and_then(|value| value.as_array())
                .and_then(|choices| choices.first())
                .and_then(|choice| choice.get("message"))
                .cloned()
                .ok_or_else(|| {
                    AgentError::Unknown(
                        "Completion response missing assistant message".to_string(),
                    )
                })?;

            let tool_calls = assistant_message
                .get("tool_calls")
                .and_then(|value| value.as_array())
                .cloned();

            let Some(tool_calls) = tool_calls else {
                // The model replied directly; remind it to conclude via final_answer.
                let answer = assistant_message
                    .get("content")
                    .and_then(|value| value.as_str())
                    .unwrap_or("")
                    .trim()
                    .to_string();

                let message = if answer.is_empty() {
                    "Assistant must call the `final_answer` tool to conclude the task, but returned no content.".to_string()
                } else {
                    format!(
                        "Assistant must call the `final_answer` tool to conclude the task. Received plain response: {}",
                        answer
                    )
                };

                memory.add_step(AgentStep::Observation {
                    tool_call_id: "final_answer".to_string(),
                    result: message,
                    is_error: true,
                });
                continue;
            };

            let turn_has_final_answer = tool_calls
                .iter()
                .any(|tool_call| extract_function_name(tool_call).as_deref() == Some("final_answer"));

            if turn_has_final_answer && tool_calls.len() > 1 {
                memory.add_step(AgentStep::Observation {
                    tool_call_id: "final_answer".to_string(),
                    result: AgentError::InvalidFunctionCall(
                        "`final_answer` must be the only tool call in a single turn".to_string(),
                    )
                    .to_error_payload()
                    .to_string(),
                    is_error: true,
                });
                continue;
            }

            for tool_call in &tool_calls {
                let tool_call_id = extract_tool_call_id(tool_call).to_string();

                let Some(function_name) = extract_function_name(tool_call) else {
                    memory.add_step(AgentStep::Observation {
                        tool_call_id,
                        result: "Tool call missing function name".to_string(),
                        is_error: true,
                    });
                    continue;
                };

                let arguments_json = match parse_function_arguments(tool_call, &function_name) {
                    Ok(value) => value,
                    Err(error) => {
                        memory.add_step(AgentStep::Observation {
                            tool_call_id,
                            result: error.to_error_payload().to_string(),
                            is_error: true,
                        });
                        continue;
                    }
                };

                if function_name == "final_answer" {
                    match serde_json::from_value::<FinalAnswerArguments>(arguments_json) {
                        Ok(args) if !args.answer.trim().is_empty() => {
                            let answer = args.answer.trim().to_string();
                            memory.add_step(AgentStep::FinalAnswer {
                                answer: answer.clone(),
                            });
                            return Ok(answer);
                        }
                        Ok(_) => {
                            memory.add_step(AgentStep::Observation {
                                tool_call_id,
                                result: AgentError::InvalidFunctionCall(
                                    "final_answer requires a non-empty `answer` field"
                                        .to_string(),
                                )
                                .to_error_payload()
                                .to_string(),
                                is_error: true,
                            });
                        }
                        Err(err) => {
                            memory.add_step(AgentStep::Observation {
                                tool_call_id,
                                result: AgentError::InvalidFunctionCall(format!(
                                    "Invalid final_answer arguments: {}",
                                    err
                                ))
                                .to_error_payload()
                                .to_string(),
                                is_error: true,
                            });
                        }
                    }
                    continue;
                }

                memory.add_step(AgentStep::Action {
                    tool_name: function_name.clone(),
                    tool_call_id: tool_call_id.clone(),
                    arguments: arguments_json.clone(),
                });

                match self
                    .function_factory()
                    .execute_function(&function_name, arguments_json)
                    .await
                {
                    Ok(result) => {
                        memory.add_step(AgentStep::Observation {
                            tool_call_id,
                            result: result.to_string(),
                            is_error: false,
                        });
                    }
                    Err(e) => {
                        memory.add_step(AgentStep::Observation {
                            tool_call_id,
                            result: e.to_error_payload().to_string(),
                            is_error: true,
                        });
                    }
                }
            }
        }

        Err(AgentError::MaxIterations(self.max_iterations()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_answer_tool_definition() {
        let definition = final_answer_tool_definition();
        assert_eq!(definition["function"]["name"], "final_answer");
        assert_eq!(
            definition["function"]["parameters"]["required"][0],
            "answer"
        );
    }

    #[test]
    fn test_extract_function_name() {
        let tool_call = json!({
            "id": "call_1",
            "function": {"name": "get_product_data", "arguments": "{}"}
        });
        assert_eq!(
            extract_function_name(&tool_call).as_deref(),
            Some("get_product_data")
        );
        assert_eq!(extract_tool_call_id(&tool_call), "call_1");

        let missing = json!({"id": "call_2", "function": {"name": ""}});
        assert!(extract_function_name(&missing).is_none());
    }

    #[test]
    fn test_parse_function_arguments() {
        let tool_call = json!({
            "function": {"name": "t", "arguments": "{\"a\": 1}"}
        });
        let parsed = parse_function_arguments(&tool_call, "t").unwrap();
        assert_eq!(parsed["a"], 1);

        let empty = json!({"function": {"name": "t", "arguments": ""}});
        assert_eq!(parse_function_arguments(&empty, "t").unwrap(), json!({}));

        let broken = json!({"function": {"name": "t", "arguments": "{oops"}});
        assert!(parse_function_arguments(&broken, "t").is_err());
    }
}
