//! Path resolution: calldata and return processing for each call mode.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{keccak256, Address};
use alloy_sol_types::SolCall;
use std::borrow::Cow;

use super::{abi, mime, Inner};
use crate::pipeline::{
    CallMode, MethodCall, NameResolution, ParsedLocator, PipelineError, ResolvedRequest,
    ResolvedTarget, ReturnProcessing,
};

fn json_arg<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, PipelineError> {
    serde_json::to_string(value).map_err(|e| invalid(format!("cannot encode argument: {}", e)))
}

fn invalid(msg: impl Into<String>) -> PipelineError {
    PipelineError::Invalid(msg.into())
}

fn percent_decode(raw: &str) -> Result<Cow<'_, str>, PipelineError> {
    urlencoding::decode(raw)
        .map_err(|_| invalid(format!("'{}' is not valid percent-encoded UTF-8", raw)))
}

/// Path segments after the leading `/`; a trailing `/` adds no segment.
fn segments(path: &str) -> Vec<&str> {
    let trimmed = path.trim_start_matches('/');
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

fn query_pairs(query: Option<&str>) -> Vec<(String, String)> {
    query
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        })
        .unwrap_or_default()
}

/// ERC-5219 `resource` and `params` for a path and query.
pub(super) fn resource_request(
    path: &str,
    query: Option<&str>,
) -> Result<(Vec<String>, Vec<abi::KeyValue>), PipelineError> {
    let resource = segments(path)
        .into_iter()
        .map(|s| percent_decode(s).map(Cow::into_owned))
        .collect::<Result<Vec<_>, _>>()?;
    let params = query_pairs(query)
        .into_iter()
        .map(|(key, value)| abi::KeyValue { key, value })
        .collect();
    Ok((resource, params))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn is_hex(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Type of an argument written without `type!`.
fn infer_type(value: &str) -> Option<DynSolType> {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return Some(DynSolType::Uint(256));
    }
    if let Some(hex) = value.strip_prefix("0x").filter(|h| is_hex(h)) {
        return match hex.len() {
            40 => Some(DynSolType::Address),
            64 => Some(DynSolType::FixedBytes(32)),
            n if n % 2 == 0 => Some(DynSolType::Bytes),
            _ => None,
        };
    }
    None
}

fn is_domain_name(value: &str) -> bool {
    !value.starts_with("0x")
        && value.contains('.')
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[derive(Default)]
struct QueryAttributes {
    returns: Option<String>,
    mime_type: Option<String>,
}

fn auto_query_attributes(query: Option<&str>) -> Result<QueryAttributes, PipelineError> {
    let mut attrs = QueryAttributes::default();
    for (key, value) in query_pairs(query) {
        match key.as_str() {
            "returns" | "returnTypes" => {
                if attrs.returns.is_some() {
                    return Err(invalid("duplicate returns attribute"));
                }
                attrs.returns = Some(value);
            }
            "mime.content" => attrs.mime_type = Some(value),
            "mime.type" => {
                let mime = mime::from_extension(&value)
                    .ok_or_else(|| invalid(format!("unknown mime.type '{}'", value)))?;
                attrs.mime_type = Some(mime.to_string());
            }
            _ => {}
        }
    }
    if attrs.returns.is_some() && attrs.mime_type.is_some() {
        return Err(invalid("returns cannot be combined with mime attributes"));
    }
    Ok(attrs)
}

fn returns_processing(returns: &str) -> Result<ReturnProcessing, PipelineError> {
    let compact: String = returns.chars().filter(|c| !c.is_whitespace()).collect();
    if compact == "()" {
        return Ok(ReturnProcessing::Raw);
    }
    match DynSolType::parse(&compact) {
        Ok(DynSolType::Tuple(_)) => Ok(ReturnProcessing::JsonEncodeValues {
            return_types: compact,
        }),
        Ok(_) => Err(invalid(format!(
            "returns '{}' must be a parenthesized type list",
            returns
        ))),
        Err(e) => Err(invalid(format!("invalid returns '{}': {}", returns, e))),
    }
}

impl Inner {
    pub(super) fn resolve_path(
        &self,
        locator: &ParsedLocator,
        target: &ResolvedTarget,
        mode: CallMode,
    ) -> Result<ResolvedRequest, PipelineError> {
        let mut request = ResolvedRequest {
            contract: target.address,
            chain_id: target.chain_id,
            mode,
            calldata: Default::default(),
            method: None,
            return_processing: ReturnProcessing::DecodeBytes { mime_type: None },
            name_resolutions: Vec::new(),
        };
        match mode {
            CallMode::Manual => {
                request.calldata = locator.path_and_query().into_bytes().into();
                request.return_processing = ReturnProcessing::DecodeBytes {
                    mime_type: mime::from_path(&locator.path).map(str::to_string),
                };
            }
            CallMode::Auto => self.resolve_auto(locator, target, &mut request)?,
            CallMode::ResourceRequest => {
                let (resource, params) =
                    resource_request(&locator.path, locator.query.as_deref())?;
                let params_json: Vec<(&str, &str)> = params
                    .iter()
                    .map(|kv| (kv.key.as_str(), kv.value.as_str()))
                    .collect();
                request.method = Some(MethodCall {
                    name: "request".to_string(),
                    arg_types: vec!["string[]".to_string(), "(string,string)[]".to_string()],
                    arg_values: vec![json_arg(&resource)?, json_arg(&params_json)?],
                });
                request.calldata = abi::requestCall { resource, params }.abi_encode().into();
                request.return_processing = ReturnProcessing::ResourceResponse;
            }
        }
        Ok(request)
    }

    fn resolve_auto(
        &self,
        locator: &ParsedLocator,
        target: &ResolvedTarget,
        request: &mut ResolvedRequest,
    ) -> Result<(), PipelineError> {
        let attrs = auto_query_attributes(locator.query.as_deref())?;
        if let Some(returns) = &attrs.returns {
            request.return_processing = returns_processing(returns)?;
        }

        let segments = segments(&locator.path);
        let Some((method, args)) = segments.split_first() else {
            if attrs.returns.is_none() {
                request.return_processing = ReturnProcessing::DecodeBytes {
                    mime_type: attrs.mime_type,
                };
            }
            return Ok(());
        };

        let method = percent_decode(method)?;
        if !is_identifier(&method) {
            return Err(invalid(format!("'{}' is not a valid method name", method)));
        }

        let mut types = Vec::with_capacity(args.len());
        let mut values = Vec::with_capacity(args.len());
        let mut shown = Vec::with_capacity(args.len());
        for raw in args {
            let arg = percent_decode(raw)?;
            let (ty, value) =
                self.auto_argument(&arg, target.chain_id, &mut request.name_resolutions)?;
            shown.push(display_value(&value, &arg));
            types.push(ty);
            values.push(value);
        }

        let call = MethodCall {
            name: method.into_owned(),
            arg_types: types.iter().map(|t| t.sol_type_name().into_owned()).collect(),
            arg_values: shown,
        };
        let selector = keccak256(call.signature().as_bytes());
        let mut calldata = selector[..4].to_vec();
        calldata.extend(DynSolValue::Tuple(values).abi_encode_params());

        if attrs.returns.is_none() {
            let mime_type = attrs.mime_type.or_else(|| {
                args.last()
                    .and_then(|last| mime::from_path(last))
                    .map(str::to_string)
            });
            request.return_processing = ReturnProcessing::DecodeBytes { mime_type };
        }
        request.calldata = calldata.into();
        request.method = Some(call);
        Ok(())
    }

    /// Types and coerces one auto-mode argument, resolving domain names.
    fn auto_argument(
        &self,
        arg: &str,
        chain_id: u64,
        resolutions: &mut Vec<NameResolution>,
    ) -> Result<(DynSolType, DynSolValue), PipelineError> {
        let (ty, value) = match arg.split_once('!') {
            Some((ty, value)) => {
                let ty = DynSolType::parse(ty)
                    .map_err(|e| invalid(format!("invalid argument type '{}': {}", ty, e)))?;
                (ty, value)
            }
            None => match infer_type(arg) {
                Some(ty) => (ty, arg),
                None if is_domain_name(arg) => (DynSolType::Address, arg),
                None => {
                    return Err(invalid(format!(
                        "cannot infer the type of argument '{}'; write it as type!value",
                        arg
                    )))
                }
            },
        };

        if ty == DynSolType::Address && is_domain_name(value) {
            let address = self.resolve_argument_name(value, chain_id, resolutions)?;
            return Ok((ty, DynSolValue::Address(address)));
        }
        let coerced = ty
            .coerce_str(value)
            .map_err(|e| {
                invalid(format!(
                    "invalid {} argument '{}': {}",
                    ty.sol_type_name(),
                    value,
                    e
                ))
            })?;
        Ok((ty, coerced))
    }

    fn resolve_argument_name(
        &self,
        name: &str,
        chain_id: u64,
        resolutions: &mut Vec<NameResolution>,
    ) -> Result<Address, PipelineError> {
        let (resolution, _) = self.resolve_name(name, chain_id, false)?;
        let address = resolution.address;
        resolutions.push(resolution);
        Ok(address)
    }
}

/// How an argument is shown in the trace: the written value, plus the
/// address for domain names.
fn display_value(value: &DynSolValue, arg: &str) -> String {
    let written = arg.split_once('!').map_or(arg, |(_, v)| v);
    match value {
        DynSolValue::Address(addr) if is_domain_name(written) => format!("{} ({})", written, addr),
        _ => written.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_splitting() {
        assert!(segments("/").is_empty());
        assert!(segments("").is_empty());
        assert_eq!(segments("/a/b/"), vec!["a", "b"]);
        assert_eq!(segments("/a//b"), vec!["a", "", "b"]);
    }

    #[test]
    fn inferred_types() {
        assert_eq!(infer_type("42"), Some(DynSolType::Uint(256)));
        assert_eq!(
            infer_type("0x4E1f41613c9084FdB9E34E11fAE9412427480e56"),
            Some(DynSolType::Address)
        );
        assert_eq!(
            infer_type(&format!("0x{}", "ab".repeat(32))),
            Some(DynSolType::FixedBytes(32))
        );
        assert_eq!(infer_type("0xabcd"), Some(DynSolType::Bytes));
        assert_eq!(infer_type("0xabc"), None);
        assert_eq!(infer_type("hello"), None);
        assert!(is_domain_name("vitalik.eth"));
        assert!(!is_domain_name("hello"));
    }

    #[test]
    fn returns_attribute() {
        assert_eq!(returns_processing("()").unwrap(), ReturnProcessing::Raw);
        assert_eq!(
            returns_processing("(uint256, string)").unwrap(),
            ReturnProcessing::JsonEncodeValues {
                return_types: "(uint256,string)".to_string()
            }
        );
        assert!(returns_processing("uint256").is_err());
        assert!(returns_processing("(notatype)").is_err());
    }

    #[test]
    fn query_attributes() {
        let attrs = auto_query_attributes(Some("mime.type=svg&other=1")).unwrap();
        assert_eq!(attrs.mime_type.as_deref(), Some("image/svg+xml"));
        let attrs = auto_query_attributes(Some("mime.content=text%2Fcsv")).unwrap();
        assert_eq!(attrs.mime_type.as_deref(), Some("text/csv"));
        assert!(auto_query_attributes(Some("returns=()&returnTypes=()")).is_err());
        assert!(auto_query_attributes(Some("returns=()&mime.type=png")).is_err());
    }

    #[test]
    fn resource_request_parts() {
        let (resource, params) =
            resource_request("/assets/a%20b.css", Some("lang=en&v=2")).unwrap();
        assert_eq!(resource, vec!["assets", "a b.css"]);
        assert_eq!(
            params,
            vec![
                abi::KeyValue {
                    key: "lang".into(),
                    value: "en".into(),
                },
                abi::KeyValue {
                    key: "v".into(),
                    value: "2".into(),
                },
            ]
        );
        let (resource, params) = resource_request("/", None).unwrap();
        assert!(resource.is_empty());
        assert!(params.is_empty());
    }
}
