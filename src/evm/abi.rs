use crate::error::Error;
/// Contract descriptors loaded from compiled artifacts
///
/// A descriptor pairs a contract ABI with its optional creation bytecode and
/// keeps the artifact JSON it was read from. Truffle (`"bytecode": "0x.."`),
/// Foundry/Hardhat (`"bytecode": {"object": "0x.."}`) and bare ABI arrays are
/// accepted.
use crate::evm::types::EvmError;
use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::Bytes;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Immutable ABI + bytecode pairing
#[derive(Debug, Clone, PartialEq)]
pub struct ContractDescriptor {
    abi: JsonAbi,
    bytecode: Option<Bytes>,
    json: Value,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    Hex(String),
    Object { object: String },
}

#[derive(Deserialize)]
struct Artifact {
    abi: JsonAbi,
    #[serde(default)]
    bytecode: Option<BytecodeField>,
}

impl ContractDescriptor {
    /// Create a descriptor from an ABI and optional bytecode
    pub fn new(abi: JsonAbi, bytecode: Option<Bytes>) -> Self {
        let json = serde_json::json!({
            "abi": abi,
            "bytecode": bytecode.as_ref().map(|b| b.to_string()),
        });
        Self {
            abi,
            bytecode,
            json,
        }
    }

    /// Parse a compiled artifact (or a bare ABI array) from JSON text
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Failed to parse artifact JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// Parse a compiled artifact (or a bare ABI array) from a JSON value
    pub fn from_value(value: Value) -> Result<Self, Error> {
        if value.is_array() {
            let abi: JsonAbi = serde_json::from_value(value.clone())
                .map_err(|e| Error::Config(format!("Failed to parse ABI JSON: {}", e)))?;
            return Ok(Self {
                abi,
                bytecode: None,
                json: value,
            });
        }

        let artifact: Artifact = serde_json::from_value(value.clone())
            .map_err(|e| Error::Config(format!("Failed to parse artifact JSON: {}", e)))?;

        let bytecode = match artifact.bytecode {
            Some(BytecodeField::Hex(hex)) | Some(BytecodeField::Object { object: hex }) => {
                decode_bytecode(&hex)?
            }
            None => None,
        };

        Ok(Self {
            abi: artifact.abi,
            bytecode,
            json: value,
        })
    }

    /// Load a compiled artifact from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!(
                "Failed to read artifact file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// The contract ABI
    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Creation bytecode, if the artifact carried any
    pub fn bytecode(&self) -> Option<&Bytes> {
        self.bytecode.as_ref()
    }

    /// The artifact JSON this descriptor was built from
    pub fn json(&self) -> &Value {
        &self.json
    }

    /// Look up a function by name (first overload)
    pub fn function(&self, name: &str) -> Result<&Function, Error> {
        self.abi
            .function(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| Error::Contract(format!("Function '{}' not found in ABI", name)))
    }

    /// ABI-encode constructor arguments
    ///
    /// An ABI without a constructor only accepts an empty argument list.
    pub fn encode_constructor(&self, args: &[DynSolValue]) -> Result<Vec<u8>, Error> {
        match &self.abi.constructor {
            Some(constructor) => constructor.abi_encode_input(args).map_err(|e| {
                EvmError::AbiError(format!("Failed to encode constructor arguments: {}", e)).into()
            }),
            None if args.is_empty() => Ok(Vec::new()),
            None => Err(EvmError::AbiError(format!(
                "ABI has no constructor but {} arguments were given",
                args.len()
            ))
            .into()),
        }
    }

    /// Deployment payload: `bytecode` followed by the encoded constructor arguments
    pub fn deployment_data(&self, bytecode: &Bytes, args: &[DynSolValue]) -> Result<Bytes, Error> {
        if bytecode.is_empty() {
            return Err(Error::Contract("Cannot deploy empty bytecode".to_string()));
        }
        let mut data = bytecode.to_vec();
        data.extend(self.encode_constructor(args)?);
        Ok(Bytes::from(data))
    }
}

fn decode_bytecode(hex_str: &str) -> Result<Option<Bytes>, Error> {
    let trimmed = hex_str.trim().trim_start_matches("0x");
    if trimmed.is_empty() {
        return Ok(None);
    }
    let bytes = hex::decode(trimmed)
        .map_err(|e| Error::Config(format!("Invalid bytecode hex: {}", e)))?;
    Ok(Some(Bytes::from(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};
    use std::io::Write;

    const STORAGE_ABI: &str = r#"[
        {"type":"constructor","inputs":[{"name":"initial","type":"uint256"},{"name":"owner","type":"address"}],"stateMutability":"nonpayable"},
        {"type":"function","name":"get","inputs":[],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"}
    ]"#;

    #[test]
    fn test_truffle_artifact() {
        let json = format!(r#"{{"contractName":"Storage","abi":{},"bytecode":"0x6080"}}"#, STORAGE_ABI);
        let descriptor = ContractDescriptor::from_json(&json).unwrap();

        assert_eq!(descriptor.bytecode(), Some(&Bytes::from(vec![0x60, 0x80])));
        assert!(descriptor.function("get").is_ok());
        assert!(descriptor.function("set").is_err());
        assert_eq!(descriptor.json()["contractName"], "Storage");
    }

    #[test]
    fn test_foundry_artifact() {
        let json = format!(
            r#"{{"abi":{},"bytecode":{{"object":"0x6080","sourceMap":""}}}}"#,
            STORAGE_ABI
        );
        let descriptor = ContractDescriptor::from_json(&json).unwrap();
        assert_eq!(descriptor.bytecode(), Some(&Bytes::from(vec![0x60, 0x80])));
    }

    #[test]
    fn test_bare_abi_and_empty_bytecode() {
        let descriptor = ContractDescriptor::from_json(STORAGE_ABI).unwrap();
        assert!(descriptor.bytecode().is_none());

        let json = format!(r#"{{"abi":{},"bytecode":"0x"}}"#, STORAGE_ABI);
        let descriptor = ContractDescriptor::from_json(&json).unwrap();
        assert!(descriptor.bytecode().is_none());
    }

    #[test]
    fn test_invalid_artifacts() {
        assert!(ContractDescriptor::from_json("not json").is_err());
        assert!(ContractDescriptor::from_json(r#"{"bytecode":"0x00"}"#).is_err());
        let bad_hex = format!(r#"{{"abi":{},"bytecode":"0xzz"}}"#, STORAGE_ABI);
        assert!(ContractDescriptor::from_json(&bad_hex).is_err());
    }

    #[test]
    fn test_deployment_data_appends_constructor_args() {
        let descriptor = ContractDescriptor::from_json(STORAGE_ABI).unwrap();
        let bytecode = Bytes::from(vec![0x60, 0x80]);
        let owner = Address::repeat_byte(0x11);

        let data = descriptor
            .deployment_data(
                &bytecode,
                &[DynSolValue::Uint(U256::from(42u64), 256), DynSolValue::Address(owner)],
            )
            .unwrap();

        assert_eq!(data.len(), 2 + 64);
        assert_eq!(&data[..2], &[0x60, 0x80]);
        assert_eq!(data[2 + 31], 42);
        assert_eq!(&data[2 + 44..2 + 64], owner.as_slice());
    }

    #[test]
    fn test_constructor_argument_mismatch() {
        let descriptor = ContractDescriptor::from_json(STORAGE_ABI).unwrap();
        assert!(descriptor.encode_constructor(&[]).is_err());

        let no_ctor = ContractDescriptor::new(JsonAbi::default(), None);
        assert!(no_ctor.encode_constructor(&[]).unwrap().is_empty());
        assert!(no_ctor
            .encode_constructor(&[DynSolValue::Bool(true)])
            .is_err());
        assert!(no_ctor
            .deployment_data(&Bytes::new(), &[])
            .is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"abi":{},"bytecode":"0x00"}}"#, STORAGE_ABI).unwrap();

        let descriptor = ContractDescriptor::from_file(file.path()).unwrap();
        assert_eq!(descriptor.bytecode(), Some(&Bytes::from(vec![0x00])));
        assert!(ContractDescriptor::from_file("/nonexistent/artifact.json").is_err());
    }
}
