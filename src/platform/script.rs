//! Transform engine backed by a user-supplied JavaScript file
//!
//! The script must define a global `decode(token, correlationId, sourceLocator)`
//! function. It may also set a global `CONTRACT_VERSION` string such as `"1.0"`.
//! Each call evaluates the script once, in a fresh runtime, and checks the
//! declared contract there before `decode` runs.

use crate::error::NsigError;
use crate::platform::engine::{ContractVersion, TransformEngine};
use deno_core::{FastString, JsRuntime, RuntimeOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

const ENGINE_NAME: &str = "script";

/// Evaluated before the user script. The runtime's console and
/// `Deno.core.print` both write to stdout.
const SILENT_PRELUDE: &str = r#"
(() => {
    const noop = () => {};
    globalThis.console = {
        log: noop, info: noop, warn: noop, error: noop,
        debug: noop, trace: noop, dir: noop, table: noop,
    };
    const core = globalThis.Deno?.core;
    if (core) {
        try { core.print = noop; } catch {}
        try { if (core.ops) core.ops.op_print = noop; } catch {}
    }
})();
"#;

const CONTRACT_EXPR: &str =
    "typeof CONTRACT_VERSION === 'undefined' ? '' : String(CONTRACT_VERSION)";

/// Evaluates a local transform script in a fresh JS runtime per call
#[derive(Debug, Clone)]
pub struct ScriptEngine {
    path: PathBuf,
    source: String,
    supported: ContractVersion,
}

impl ScriptEngine {
    /// Load the transform script at `path`
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, NsigError> {
        let path = path.as_ref().to_path_buf();
        let source = std::fs::read_to_string(&path)?;
        Ok(Self {
            path,
            source,
            supported: ContractVersion::SUPPORTED,
        })
    }

    /// Use an in-memory script
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            path: PathBuf::from("<inline>"),
            source: source.into(),
            supported: ContractVersion::SUPPORTED,
        }
    }

    /// Override the contract version scripts may declare
    pub fn with_supported_contract(mut self, supported: ContractVersion) -> Self {
        self.supported = supported;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a runtime with the script evaluated and `decode` present
    fn load(&self) -> Result<JsRuntime, NsigError> {
        let mut runtime = JsRuntime::new(RuntimeOptions::default());
        eval_string(&mut runtime, "<prelude>", SILENT_PRELUDE)?;

        runtime
            .execute_script("<transform>", FastString::from(self.source.clone()))
            .map_err(|e| {
                NsigError::engine_failure(ENGINE_NAME, format!("script evaluation error: {:?}", e))
            })?;

        let kind = eval_string(&mut runtime, "<decode-check>", "typeof decode")?;
        if kind != "function" {
            return Err(NsigError::engine_incompatible(
                ENGINE_NAME,
                format!("{} does not define a decode function", self.path.display()),
            ));
        }

        Ok(runtime)
    }

    /// Read the contract the evaluated script declares
    fn declared_contract(&self, runtime: &mut JsRuntime) -> Result<ContractVersion, NsigError> {
        let declared = eval_string(runtime, "<contract>", CONTRACT_EXPR)?;
        if declared.is_empty() {
            return Ok(ContractVersion::default());
        }
        declared
            .parse()
            .map_err(|e: String| NsigError::engine_incompatible(ENGINE_NAME, e))
    }

    async fn run_decode(
        &self,
        token: &str,
        correlation_id: &str,
        source_locator: &str,
    ) -> Result<String, NsigError> {
        let mut runtime = self.load()?;

        let declared = self.declared_contract(&mut runtime)?;
        if !declared.is_compatible_with(&self.supported) {
            return Err(NsigError::engine_incompatible(
                ENGINE_NAME,
                format!(
                    "script declares contract {}, invoker supports {}",
                    declared, self.supported
                ),
            ));
        }

        let call_code = format!(
            "decode({}, {}, {})",
            js_string(token),
            js_string(correlation_id),
            js_string(source_locator)
        );
        let result = runtime
            .execute_script("<call>", FastString::from(call_code))
            .map_err(|e| NsigError::engine_failure(ENGINE_NAME, format!("decode threw: {:?}", e)))?;

        let resolved = runtime.resolve(result).await.map_err(|e| {
            NsigError::engine_failure(ENGINE_NAME, format!("decode rejected: {:?}", e))
        })?;

        let scope = &mut runtime.handle_scope();
        let local_value = resolved.open(scope);
        Ok(local_value.to_rust_string_lossy(scope))
    }
}

#[async_trait::async_trait]
impl TransformEngine for ScriptEngine {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    // The declared contract is only known after evaluation, so it is
    // checked inside `decode` against the same runtime.

    async fn decode(
        &self,
        token: &str,
        correlation_id: &str,
        source_locator: &str,
    ) -> Result<String, NsigError> {
        debug!("Evaluating transform script {}", self.path.display());

        // JsRuntime is not Send, so it lives on a dedicated blocking thread
        // with its own single-threaded executor.
        let engine = self.clone();
        let token = token.to_string();
        let correlation_id = correlation_id.to_string();
        let source_locator = source_locator.to_string();

        tokio::task::spawn_blocking(move || -> Result<String, NsigError> {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(engine.run_decode(&token, &correlation_id, &source_locator))
        })
        .await
        .map_err(|e| NsigError::engine_failure(ENGINE_NAME, format!("script task failed: {}", e)))?
    }
}

/// Evaluate `code` and convert the completion value to a string
fn eval_string(
    runtime: &mut JsRuntime,
    name: &'static str,
    code: &'static str,
) -> Result<String, NsigError> {
    let value = runtime
        .execute_script(name, FastString::from(code.to_string()))
        .map_err(|e| NsigError::engine_failure(ENGINE_NAME, format!("{:?}", e)))?;
    let scope = &mut runtime.handle_scope();
    let local_value = value.open(scope);
    Ok(local_value.to_rust_string_lossy(scope))
}

/// Encode `value` as a JS string literal
fn js_string(value: &str) -> String {
    // A JSON string is a valid JS string literal.
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const REVERSE_SCRIPT: &str = r#"
        function decode(token, correlationId, sourceLocator) {
            return token.split("").reverse().join("");
        }
    "#;

    #[test]
    fn test_js_string_escapes() {
        assert_eq!(js_string("abc"), r#""abc""#);
        assert_eq!(js_string(r#"a"b\c"#), r#""a\"b\\c""#);
        assert_eq!(js_string("line\nbreak"), r#""line\nbreak""#);
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = ScriptEngine::from_path("/nonexistent/transform.js");
        assert!(matches!(result, Err(NsigError::IoError(_))));
    }

    #[test]
    fn test_from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(REVERSE_SCRIPT.as_bytes()).unwrap();

        let engine = ScriptEngine::from_path(file.path()).unwrap();
        assert_eq!(engine.path(), file.path());
        assert_eq!(engine.name(), "script");
    }

    #[tokio::test]
    async fn test_decode_calls_script() {
        let engine = ScriptEngine::from_source(REVERSE_SCRIPT);
        let result = engine.decode("abc123", "vid", "url").await.unwrap();
        assert_eq!(result, "321cba");
    }

    #[tokio::test]
    async fn test_decode_receives_all_arguments() {
        let engine = ScriptEngine::from_source(
            r#"function decode(t, c, s) { return [s, t, c].join("|"); }"#,
        );
        let result = engine
            .decode("si\"g", "vid", "https://host/s/player/af7f576f/base.js")
            .await
            .unwrap();
        assert_eq!(result, "https://host/s/player/af7f576f/base.js|si\"g|vid");
    }

    #[tokio::test]
    async fn test_decode_async_function() {
        let engine =
            ScriptEngine::from_source(r#"async function decode(t) { return "async:" + t; }"#);
        assert_eq!(engine.decode("x", "y", "z").await.unwrap(), "async:x");
    }

    #[tokio::test]
    async fn test_console_output_is_silenced() {
        let engine = ScriptEngine::from_source(
            r#"console.log("loading player"); function decode(t) { console.info("decoding"); return t; }"#,
        );
        assert_eq!(engine.decode("abc", "y", "z").await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_decode_exception_is_engine_failure() {
        let engine = ScriptEngine::from_source(
            r#"function decode() { throw new Error("unsupported player"); }"#,
        );
        let err = engine.decode("x", "y", "z").await.unwrap_err();
        assert!(matches!(err, NsigError::EngineFailure { .. }));
    }

    #[tokio::test]
    async fn test_missing_decode_is_incompatible() {
        let engine = ScriptEngine::from_source("var transform = 1;");
        let err = engine.decode("x", "y", "z").await.unwrap_err();
        assert!(matches!(err, NsigError::EngineIncompatible { .. }));
    }

    #[tokio::test]
    async fn test_contract_version_default() {
        let engine = ScriptEngine::from_source(REVERSE_SCRIPT);
        assert_eq!(engine.contract_version().unwrap(), ContractVersion::new(1, 0));
        assert_eq!(engine.decode("abc", "y", "z").await.unwrap(), "cba");
    }

    #[tokio::test]
    async fn test_declared_contract_checked_before_decode() {
        let engine = ScriptEngine::from_source(
            "var CONTRACT_VERSION = \"2.1\";\n\
             function decode(t) { throw new Error(\"decode must not run\"); }",
        );
        let err = engine.decode("x", "y", "z").await.unwrap_err();
        assert!(matches!(err, NsigError::EngineIncompatible { .. }));
        assert!(err.to_string().contains("2.1"));
    }

    #[tokio::test]
    async fn test_declared_contract_custom_supported() {
        let engine = ScriptEngine::from_source(format!(
            "var CONTRACT_VERSION = \"2.1\";\n{}",
            REVERSE_SCRIPT
        ))
        .with_supported_contract(ContractVersion::new(2, 1));
        assert_eq!(engine.decode("abc", "y", "z").await.unwrap(), "cba");
    }

    #[tokio::test]
    async fn test_contract_version_unparsable() {
        let engine = ScriptEngine::from_source(format!(
            "var CONTRACT_VERSION = \"latest\";\n{}",
            REVERSE_SCRIPT
        ));
        let err = engine.decode("x", "y", "z").await.unwrap_err();
        assert!(matches!(err, NsigError::EngineIncompatible { .. }));
        assert!(err.to_string().contains("latest"));
    }

    #[tokio::test]
    async fn test_each_call_evaluates_script_once() {
        let engine = ScriptEngine::from_source(
            r#"
            globalThis.evaluations = (globalThis.evaluations || 0) + 1;
            function decode(t) { return t + ":" + globalThis.evaluations; }
            "#,
        );
        assert_eq!(engine.decode("abc", "y", "z").await.unwrap(), "abc:1");
        assert_eq!(engine.decode("abc", "y", "z").await.unwrap(), "abc:1");
    }

    #[tokio::test]
    async fn test_core_print_is_silenced() {
        let engine = ScriptEngine::from_source(
            r#"
            Deno.core.print("[youtube] loading player\n");
            function decode(t) {
                Deno.core.print("decoding\n");
                Deno.core.ops.op_print("raw op\n", false);
                return t;
            }
            "#,
        );
        assert_eq!(engine.decode("abc", "y", "z").await.unwrap(), "abc");
    }
}
