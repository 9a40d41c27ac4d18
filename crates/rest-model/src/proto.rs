use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use vertex_chat_model::{
    GenerationParams, InputOutputTextPair, TextResponse, TurnMessage,
};

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Content {
    content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Example {
    input: Content,
    output: Content,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Message {
    author: &'static str,
    content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChatInstance {
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    examples: Vec<Example>,
    messages: Vec<Message>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PredictRequest {
    instances: Vec<ChatInstance>,
    parameters: Parameters,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StreamingPredictRequest {
    inputs: Vec<Tensor>,
    parameters: Tensor,
}

// ------------------------------
// Types received from the server
// ------------------------------

/// Empty tensors decode to `null`, treat them like missing fields.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Candidate {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Prediction {
    #[serde(default, deserialize_with = "null_as_default")]
    pub candidates: Vec<Candidate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct PredictResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub predictions: Vec<Prediction>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StreamingPredictResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub outputs: Vec<Tensor>,
}

/// The generic value container of the streaming prediction API.
///
/// Scalars are wrapped in single-element lists, objects become `structVal`
/// and arrays become `listVal`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tensor {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    bool_val: Vec<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    string_val: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    int_val: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    double_val: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    list_val: Vec<Tensor>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    struct_val: BTreeMap<String, Tensor>,
}

impl Tensor {
    pub fn from_value(value: &Value) -> Self {
        let mut tensor = Tensor::default();
        match value {
            Value::Null => {}
            Value::Bool(b) => tensor.bool_val.push(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => tensor.int_val.push(i),
                None => tensor.double_val.push(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => tensor.string_val.push(s.clone()),
            Value::Array(items) => {
                tensor.list_val = items.iter().map(Tensor::from_value).collect();
            }
            Value::Object(fields) => {
                tensor.struct_val = fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Tensor::from_value(v)))
                    .collect();
            }
        }
        tensor
    }

    pub fn into_value(self) -> Value {
        if !self.struct_val.is_empty() {
            let fields: Map<String, Value> = self
                .struct_val
                .into_iter()
                .map(|(k, v)| (k, v.into_value()))
                .collect();
            return Value::Object(fields);
        }
        if !self.list_val.is_empty() {
            return Value::Array(
                self.list_val.into_iter().map(Tensor::into_value).collect(),
            );
        }
        if !self.string_val.is_empty() {
            return scalar_or_array(self.string_val, Value::String);
        }
        if !self.bool_val.is_empty() {
            return scalar_or_array(self.bool_val, Value::Bool);
        }
        if !self.int_val.is_empty() {
            return scalar_or_array(self.int_val, |i| Value::Number(i.into()));
        }
        if !self.double_val.is_empty() {
            return scalar_or_array(self.double_val, |f| {
                Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
            });
        }
        Value::Null
    }
}

fn scalar_or_array<T>(mut items: Vec<T>, f: impl Fn(T) -> Value) -> Value {
    if items.len() == 1 {
        if let Some(item) = items.pop() {
            return f(item);
        }
    }
    Value::Array(items.into_iter().map(f).collect())
}

// -----------
// Conversions
// -----------

/// Parameters of a chat session, in the shape of the API.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatPayload {
    pub context: Option<String>,
    pub examples: Vec<InputOutputTextPair>,
    pub messages: Vec<TurnMessage>,
    pub params: GenerationParams,
}

#[inline]
fn create_instance(payload: &ChatPayload) -> ChatInstance {
    ChatInstance {
        context: payload.context.clone(),
        examples: payload.examples.iter().map(create_example).collect(),
        messages: payload.messages.iter().map(create_message).collect(),
    }
}

#[inline]
fn create_example(example: &InputOutputTextPair) -> Example {
    Example {
        input: Content {
            content: example.input_text.clone(),
        },
        output: Content {
            content: example.output_text.clone(),
        },
    }
}

#[inline]
fn create_message(turn: &TurnMessage) -> Message {
    Message {
        author: turn.author.as_str(),
        content: turn.content.clone(),
    }
}

/// Widens through the shortest decimal form, so `0.95` stays `0.95`
/// instead of `0.949999988079071`.
#[inline]
fn widen(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(f64::from(value))
}

#[inline]
fn create_parameters(params: &GenerationParams) -> Parameters {
    Parameters {
        temperature: params.temperature.map(widen),
        max_output_tokens: params.max_output_tokens,
        top_k: params.top_k,
        top_p: params.top_p.map(widen),
    }
}

#[inline]
pub fn create_request(payload: &ChatPayload) -> PredictRequest {
    PredictRequest {
        instances: vec![create_instance(payload)],
        parameters: create_parameters(&payload.params),
    }
}

pub fn create_streaming_request(
    payload: &ChatPayload,
) -> Result<StreamingPredictRequest, serde_json::Error> {
    let instance = serde_json::to_value(create_instance(payload))?;
    let parameters = serde_json::to_value(create_parameters(&payload.params))?;
    Ok(StreamingPredictRequest {
        inputs: vec![Tensor::from_value(&instance)],
        parameters: Tensor::from_value(&parameters),
    })
}

/// Picks the answer out of a prediction. A prediction without candidates
/// (e.g. blocked by the safety filters) yields an empty text.
#[inline]
fn first_candidate(predictions: Vec<Prediction>) -> TextResponse {
    let text = predictions
        .into_iter()
        .next()
        .and_then(|p| p.candidates.into_iter().next())
        .map(|c| c.content)
        .unwrap_or_default();
    TextResponse { text }
}

#[inline]
pub fn parse_response(resp: PredictResponse) -> TextResponse {
    first_candidate(resp.predictions)
}

pub fn parse_streaming_response(
    resp: StreamingPredictResponse,
) -> Result<TextResponse, serde_json::Error> {
    let predictions = resp
        .outputs
        .into_iter()
        .map(|output| serde_json::from_value(output.into_value()))
        .collect::<Result<Vec<Prediction>, _>>()?;
    Ok(first_candidate(predictions))
}
