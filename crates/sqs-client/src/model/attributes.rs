//! Typed message attribute values.

use super::join;
use crate::error::SqsError;
use crate::protocol::{QueryParams, XmlElement};
use crate::validation::{require_str, FaultAggregator, InvalidParams, Validate, ValidationFault};
use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// User-defined message attribute
///
/// `data_type` is required and is one of `String`, `Number` or `Binary`,
/// optionally followed by a custom suffix (`Number.float`). Binary values
/// are base64 encoded on the wire and in JSON/YAML files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MessageAttributeValue {
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", with = "bytes_serde::option")]
    pub binary_value: Option<Bytes>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub string_list_values: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", with = "bytes_serde::list")]
    pub binary_list_values: Vec<Bytes>,
}

const DATA_TYPES: [&str; 3] = ["String", "Number", "Binary"];

/// Attribute reserved for the service, such as `AWSTraceHeader`
pub type MessageSystemAttributeValue = MessageAttributeValue;

impl MessageAttributeValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            data_type: Some("String".to_string()),
            string_value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn number(value: impl ToString) -> Self {
        Self {
            data_type: Some("Number".to_string()),
            string_value: Some(value.to_string()),
            ..Self::default()
        }
    }

    pub fn binary(value: impl Into<Bytes>) -> Self {
        Self {
            data_type: Some("Binary".to_string()),
            binary_value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Add a custom suffix to the data type, e.g. `Number` becomes `Number.float`
    pub fn with_custom_type(mut self, suffix: impl AsRef<str>) -> Self {
        if let Some(data_type) = self.data_type.take() {
            self.data_type = Some(format!("{}.{}", data_type, suffix.as_ref()));
        }
        self
    }

    /// Bytes counted towards the message size limit, excluding the name
    pub fn payload_size(&self) -> usize {
        self.data_type.as_ref().map_or(0, String::len)
            + self.string_value.as_ref().map_or(0, String::len)
            + self.binary_value.as_ref().map_or(0, Bytes::len)
            + self.string_list_values.iter().map(String::len).sum::<usize>()
            + self.binary_list_values.iter().map(Bytes::len).sum::<usize>()
    }

    fn write_params(&self, prefix: &str, params: &mut QueryParams) {
        params.insert_opt(join(prefix, "DataType"), self.data_type.as_deref());
        params.insert_opt(join(prefix, "StringValue"), self.string_value.as_deref());
        if let Some(binary) = &self.binary_value {
            params.insert(
                join(prefix, "BinaryValue"),
                general_purpose::STANDARD.encode(binary),
            );
        }
        params.insert_list(&join(prefix, "StringListValue"), &self.string_list_values);
        let encoded: Vec<String> = self
            .binary_list_values
            .iter()
            .map(|b| general_purpose::STANDARD.encode(b))
            .collect();
        params.insert_list(&join(prefix, "BinaryListValue"), &encoded);
    }

    fn from_xml(element: &XmlElement) -> Result<Self, SqsError> {
        let binary_value = element
            .child_text("BinaryValue")
            .map(|text| decode_binary(&text))
            .transpose()?;
        let binary_list_values = element
            .child_texts("BinaryListValue")
            .iter()
            .map(|text| decode_binary(text))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            data_type: element.child_text("DataType"),
            string_value: element.child_text("StringValue"),
            binary_value,
            string_list_values: element.child_texts("StringListValue"),
            binary_list_values,
        })
    }
}

impl Validate for MessageAttributeValue {
    fn validate(&self) -> Result<(), InvalidParams> {
        let mut faults = FaultAggregator::new("MessageAttributeValue");
        require_str(&mut faults, "DataType", &self.data_type);
        if let Some(data_type) = self.data_type.as_deref().filter(|t| !t.is_empty()) {
            let base = data_type.split('.').next().unwrap_or_default();
            if !DATA_TYPES.contains(&base) {
                faults.add(ValidationFault::invalid(
                    "DataType",
                    format!(
                        "'{}' must start with String, Number or Binary",
                        data_type
                    ),
                ));
            }
        }
        faults.into_result()
    }
}

fn decode_binary(text: &str) -> Result<Bytes, SqsError> {
    general_purpose::STANDARD
        .decode(text.trim())
        .map(Bytes::from)
        .map_err(|e| SqsError::serialization(format!("Invalid base64 attribute value: {}", e)))
}

/// Validate every value of an attribute map under `field["name"]`
pub(crate) fn validate_attribute_map(
    faults: &mut FaultAggregator,
    field: &str,
    attributes: &BTreeMap<String, MessageAttributeValue>,
) {
    for (name, value) in attributes {
        if let Err(nested) = value.validate() {
            faults.add_nested(&format!("{}[\"{}\"]", field, name), nested);
        }
    }
}

/// Write an attribute map as `{prefix}.{wire_name}.N.Name` / `.N.Value.*`
pub(crate) fn write_attribute_map(
    params: &mut QueryParams,
    prefix: &str,
    wire_name: &str,
    attributes: &BTreeMap<String, MessageAttributeValue>,
) {
    for (idx, (name, value)) in attributes.iter().enumerate() {
        let member = format!("{}.{}", join(prefix, wire_name), idx + 1);
        params.insert(join(&member, "Name"), name.as_str());
        value.write_params(&join(&member, "Value"), params);
    }
}

/// Read repeated `<wire_name><Name/><Value>...</Value></wire_name>` children
pub(crate) fn read_attribute_map(
    element: &XmlElement,
    wire_name: &str,
) -> Result<BTreeMap<String, MessageAttributeValue>, SqsError> {
    let mut attributes = BTreeMap::new();
    for entry in element.children_named(wire_name) {
        let name = entry.required_text("Name")?;
        let value = match entry.child("Value") {
            Some(value) => MessageAttributeValue::from_xml(value)?,
            None => MessageAttributeValue::default(),
        };
        attributes.insert(name, value);
    }
    Ok(attributes)
}

/// Size of an attribute map, counting names, types and values
pub(crate) fn attribute_map_size(attributes: &BTreeMap<String, MessageAttributeValue>) -> usize {
    attributes
        .iter()
        .map(|(name, value)| name.len() + value.payload_size())
        .sum()
}

/// Base64 serialization for binary attribute values
mod bytes_serde {
    use base64::{engine::general_purpose, Engine as _};
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    fn decode<E: serde::de::Error>(encoded: &str) -> Result<Bytes, E> {
        general_purpose::STANDARD
            .decode(encoded)
            .map(Bytes::from)
            .map_err(E::custom)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S>(bytes: &Option<Bytes>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            bytes
                .as_ref()
                .map(|b| general_purpose::STANDARD.encode(b))
                .serialize(serializer)
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Bytes>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|encoded| decode(&encoded))
                .transpose()
        }
    }

    pub mod list {
        use super::*;

        pub fn serialize<S>(values: &[Bytes], serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            values
                .iter()
                .map(|b| general_purpose::STANDARD.encode(b))
                .collect::<Vec<_>>()
                .serialize(serializer)
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Bytes>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Vec::<String>::deserialize(deserializer)?
                .iter()
                .map(|encoded| decode(encoded))
                .collect()
        }
    }
}
