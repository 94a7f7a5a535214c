//! Static evaluation of executable config modules.
//!
//! Config files such as `jest.config.js` or `jest.config.ts` export their
//! configuration from code. Rather than running the module, its source is parsed
//! and the exported value is evaluated from the syntax tree. Literals, arrays,
//! objects (including spreads), top-level bindings, `defineConfig(...)`-style
//! wrappers and functions returning a config are understood. Anything that
//! would need a runtime evaluates to `null`.

use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_parser::{Parser as OxcParser, ParserReturn};
use oxc_span::SourceType;
use oxc_syntax::operator::UnaryOperator;
use serde_json::{Map, Number, Value};
use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet},
    path::Path,
};

use crate::error::LoadCause;

const MAX_EVAL_DEPTH: usize = 64;

/// Upper bound on expression nodes evaluated for one module, counting reused bindings by size
const MAX_EVAL_NODES: usize = 100_000;

pub(crate) fn evaluate_module(path: &Path, src: &str) -> Result<Value, LoadCause> {
    let st = source_type_for(path);
    let allocator = Allocator::default();
    let ParserReturn { program, errors, panicked, .. } =
        OxcParser::new(&allocator, src, st).parse();

    if panicked || !errors.is_empty() {
        let mut messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        if messages.is_empty() {
            messages.push("parser aborted".to_string());
        }
        debug!("Failed to parse {}: {} diagnostics", path.display(), messages.len());
        return Err(LoadCause::Syntax(messages));
    }

    let mut evaluator = ModuleEvaluator::default();
    let mut exported: Option<Exported> = None;
    let mut named: Vec<(String, &Expression)> = Vec::new();

    for stmt in &program.body {
        match stmt {
            Statement::VariableDeclaration(vd) => evaluator.bind(vd),
            Statement::ExportNamedDeclaration(decl) => {
                if let Some(Declaration::VariableDeclaration(vd)) = &decl.declaration {
                    evaluator.bind(vd);
                }
            }
            Statement::ExpressionStatement(es) => {
                let Expression::AssignmentExpression(ae) = &es.expression else {
                    continue;
                };
                let AssignmentTarget::StaticMemberExpression(target) = &ae.left else {
                    continue;
                };
                if is_module_exports(&target.object, target.property.name.as_str()) {
                    // `module.exports = ...` replaces anything assigned piecemeal so far
                    trace!("Found module.exports assignment in {}", path.display());
                    exported = Some(Exported::Expression(&ae.right));
                    named.clear();
                } else if is_identifier(&target.object, "exports")
                    || matches!(&target.object, Expression::StaticMemberExpression(m)
                        if is_module_exports(&m.object, m.property.name.as_str()))
                {
                    trace!("Found named export '{}' in {}", target.property.name, path.display());
                    named.push((target.property.name.to_string(), &ae.right));
                }
            }
            Statement::ExportDefaultDeclaration(decl) => {
                trace!("Found default export in {}", path.display());
                exported = match &decl.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(f) => {
                        f.body.as_deref().map(|body| Exported::FunctionBody(body, false))
                    }
                    kind => kind.as_expression().map(Exported::Expression),
                };
            }
            Statement::TSExportAssignment(assign) => {
                exported = Some(Exported::Expression(&assign.expression));
            }
            _ => {}
        }
    }

    if exported.is_none() && named.is_empty() {
        debug!("No exported configuration found in {}", path.display());
        return Err(LoadCause::MissingExport);
    }

    let mut value = match exported {
        Some(Exported::Expression(expr)) => evaluator.evaluate(expr, 0),
        Some(Exported::FunctionBody(body, is_expression)) => {
            evaluator.function_result(body, is_expression, 0)
        }
        None => Value::Object(Map::new()),
    };

    if !named.is_empty() {
        if value.is_null() {
            value = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut value {
            for (key, expr) in named {
                map.insert(key, evaluator.evaluate(expr, 0));
            }
        }
    }

    Ok(value)
}

enum Exported<'s, 'a> {
    Expression(&'s Expression<'a>),
    /// A function whose return value is the configuration. The flag marks an
    /// arrow function with an expression body.
    FunctionBody(&'s FunctionBody<'a>, bool),
}

#[derive(Default)]
struct ModuleEvaluator<'s, 'a> {
    bindings: HashMap<String, &'s Expression<'a>>,
    /// Evaluated bindings with the number of nodes it took to build them
    resolved: RefCell<HashMap<String, (Value, usize)>>,
    in_progress: RefCell<HashSet<String>>,
    spent: Cell<usize>,
}

impl<'s, 'a> ModuleEvaluator<'s, 'a> {
    fn bind(&mut self, vd: &'s VariableDeclaration<'a>) {
        for decl in &vd.declarations {
            if let (Some(id), Some(init)) = (decl.id.get_binding_identifier(), &decl.init) {
                trace!("Recording top-level binding '{}'", id.name);
                self.bindings.insert(id.name.to_string(), init);
            }
        }
    }

    fn evaluate(&self, expr: &Expression<'a>, depth: usize) -> Value {
        if depth > MAX_EVAL_DEPTH {
            trace!("Evaluation depth exceeded, giving up on expression");
            return Value::Null;
        }
        if !self.charge(1) {
            return Value::Null;
        }
        let depth = depth + 1;

        match expr {
            Expression::StringLiteral(s) => Value::String(s.value.to_string()),
            Expression::NumericLiteral(n) => number(n.value),
            Expression::BooleanLiteral(b) => Value::Bool(b.value),
            Expression::NullLiteral(_) => Value::Null,
            Expression::TemplateLiteral(t) if t.expressions.is_empty() => t
                .quasis
                .first()
                .and_then(|q| q.value.cooked.as_ref())
                .map(|cooked| Value::String(cooked.to_string()))
                .unwrap_or(Value::Null),
            Expression::UnaryExpression(u) if u.operator == UnaryOperator::UnaryNegation => {
                match self.evaluate(&u.argument, depth) {
                    Value::Number(n) => n.as_f64().map(|f| number(-f)).unwrap_or(Value::Null),
                    _ => Value::Null,
                }
            }
            Expression::ArrayExpression(ae) => {
                let mut items = Vec::with_capacity(ae.elements.len());
                for elem in &ae.elements {
                    match elem {
                        ArrayExpressionElement::SpreadElement(spread) => {
                            if let Value::Array(spread_items) =
                                self.evaluate(&spread.argument, depth)
                            {
                                items.extend(spread_items);
                            }
                        }
                        ArrayExpressionElement::Elision(_) => items.push(Value::Null),
                        _ => {
                            if let Some(e) = elem.as_expression() {
                                items.push(self.evaluate(e, depth));
                            }
                        }
                    }
                }
                Value::Array(items)
            }
            Expression::ObjectExpression(oe) => {
                let mut map = Map::new();
                for prop in &oe.properties {
                    match prop {
                        ObjectPropertyKind::ObjectProperty(p) => {
                            if let Some(key) = p.key.static_name() {
                                map.insert(key.into_owned(), self.evaluate(&p.value, depth));
                            } else {
                                trace!("Skipping computed property key");
                            }
                        }
                        ObjectPropertyKind::SpreadProperty(spread) => {
                            if let Value::Object(inner) = self.evaluate(&spread.argument, depth) {
                                map.extend(inner);
                            }
                        }
                    }
                }
                Value::Object(map)
            }
            Expression::Identifier(ident) => self.evaluate_binding(ident.name.as_str(), depth),
            Expression::CallExpression(ce) => self.evaluate_call(ce, depth),
            Expression::ArrowFunctionExpression(af) => {
                self.function_result(&af.body, af.expression, depth)
            }
            Expression::FunctionExpression(f) => f
                .body
                .as_deref()
                .map(|body| self.function_result(body, false, depth))
                .unwrap_or(Value::Null),
            Expression::ParenthesizedExpression(pe) => self.evaluate(&pe.expression, depth),
            Expression::AwaitExpression(ae) => self.evaluate(&ae.argument, depth),
            Expression::TSAsExpression(e) => self.evaluate(&e.expression, depth),
            Expression::TSSatisfiesExpression(e) => self.evaluate(&e.expression, depth),
            Expression::TSNonNullExpression(e) => self.evaluate(&e.expression, depth),
            Expression::TSTypeAssertion(e) => self.evaluate(&e.expression, depth),
            _ => Value::Null,
        }
    }

    /// Evaluates a top-level binding once and reuses the value. A binding that
    /// refers back to itself while being evaluated yields `null` at that point.
    fn evaluate_binding(&self, name: &str, depth: usize) -> Value {
        if let Some((value, size)) = self.resolved.borrow().get(name) {
            return if self.charge(*size) { value.clone() } else { Value::Null };
        }
        let Some(init) = self.bindings.get(name).copied() else {
            trace!("Unknown identifier '{}' evaluates to null", name);
            return Value::Null;
        };
        if !self.in_progress.borrow_mut().insert(name.to_string()) {
            trace!("Binding '{}' refers to itself", name);
            return Value::Null;
        }

        let spent_before = self.spent.get();
        let value = self.evaluate(init, depth);
        self.in_progress.borrow_mut().remove(name);

        let size = self.spent.get().saturating_sub(spent_before);
        self.resolved.borrow_mut().insert(name.to_string(), (value.clone(), size));
        value
    }

    fn charge(&self, nodes: usize) -> bool {
        let spent = self.spent.get().saturating_add(nodes);
        self.spent.set(spent);
        if spent > MAX_EVAL_NODES {
            trace!("Evaluation budget of {} nodes spent", MAX_EVAL_NODES);
            return false;
        }
        true
    }

    fn evaluate_call(&self, ce: &CallExpression<'a>, depth: usize) -> Value {
        let first_arg = ce.arguments.first().and_then(|arg| arg.as_expression());

        match &ce.callee {
            // require.resolve('./setup') names the module it resolves
            Expression::StaticMemberExpression(m)
                if is_identifier(&m.object, "require") && m.property.name.as_str() == "resolve" =>
            {
                match first_arg {
                    Some(Expression::StringLiteral(sl)) => Value::String(sl.value.to_string()),
                    _ => Value::Null,
                }
            }
            Expression::Identifier(ident) if ident.name.as_str() == "require" => {
                trace!("Not following require() inside config module");
                Value::Null
            }
            // defineConfig({...}) and similar identity wrappers
            Expression::Identifier(_) if ce.arguments.len() == 1 => {
                first_arg.map(|arg| self.evaluate(arg, depth)).unwrap_or(Value::Null)
            }
            Expression::Identifier(ident) => {
                trace!(
                    "Call to '{}' with {} arguments evaluates to null",
                    ident.name,
                    ce.arguments.len()
                );
                Value::Null
            }
            _ => Value::Null,
        }
    }

    fn function_result(&self, body: &FunctionBody<'a>, is_expression: bool, depth: usize) -> Value {
        for stmt in &body.statements {
            match stmt {
                Statement::ReturnStatement(ret) => {
                    return ret
                        .argument
                        .as_ref()
                        .map(|arg| self.evaluate(arg, depth))
                        .unwrap_or(Value::Null);
                }
                Statement::ExpressionStatement(es) if is_expression => {
                    return self.evaluate(&es.expression, depth);
                }
                _ => {}
            }
        }
        Value::Null
    }
}

fn is_identifier(expr: &Expression, name: &str) -> bool {
    matches!(expr, Expression::Identifier(ident) if ident.name.as_str() == name)
}

fn is_module_exports(object: &Expression, property: &str) -> bool {
    is_identifier(object, "module") && property == "exports"
}

fn number(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Value::from(f as i64)
    } else {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn source_type_for(path: &Path) -> SourceType {
    SourceType::from_path(path).unwrap_or_else(|_| {
        trace!("Unknown extension for {}, parsing as TypeScript module", path.display());
        SourceType::default().with_typescript(true).with_module(true)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval(name: &str, src: &str) -> Result<Value, LoadCause> {
        evaluate_module(Path::new(name), src)
    }

    #[test]
    fn test_module_exports_object() {
        let value = eval(
            "jest.config.js",
            "module.exports = { testEnvironment: 'jsdom', setupFiles: ['./setup.js'], verbose: true, bail: 1 };",
        )
        .unwrap();
        assert_eq!(
            value,
            json!({
                "testEnvironment": "jsdom",
                "setupFiles": ["./setup.js"],
                "verbose": true,
                "bail": 1
            })
        );
    }

    #[test]
    fn test_export_default_typed_binding() {
        let value = eval(
            "jest.config.ts",
            r#"
import type { Config } from 'jest';

const config: Config = {
  preset: 'ts-jest',
  transform: { '^.+\\.tsx?$': ['ts-jest', { isolatedModules: true }] },
};

export default config;
"#,
        )
        .unwrap();
        assert_eq!(value["preset"], "ts-jest");
        assert_eq!(value["transform"]["^.+\\.tsx?$"], json!(["ts-jest", {"isolatedModules": true}]));
    }

    #[test]
    fn test_define_config_wrapper_and_satisfies() {
        let value = eval(
            "jest.config.mts",
            "export default defineConfig({ resolver: 'jest-resolver-enhanced' } satisfies Config);",
        )
        .unwrap();
        assert_eq!(value, json!({"resolver": "jest-resolver-enhanced"}));
    }

    #[test]
    fn test_arrow_function_export() {
        let value = eval(
            "jest.config.js",
            "module.exports = async () => { return { testEnvironment: 'node' }; };",
        )
        .unwrap();
        assert_eq!(value, json!({"testEnvironment": "node"}));

        let value = eval("jest.config.js", "module.exports = () => ({ bail: -2 });").unwrap();
        assert_eq!(value, json!({"bail": -2}));
    }

    #[test]
    fn test_default_function_declaration() {
        let value = eval(
            "jest.config.ts",
            "export default function config() { return { watchPlugins: [`jest-watch-typeahead/filename`] }; }",
        )
        .unwrap();
        assert_eq!(value, json!({"watchPlugins": ["jest-watch-typeahead/filename"]}));
    }

    #[test]
    fn test_spreads_and_shorthand() {
        let value = eval(
            "jest.config.js",
            r#"
const base = { testEnvironment: 'node', setupFiles: ['a'] };
const setupFilesAfterEnv = [...base.setupFiles, './b.js'];
module.exports = { ...base, testEnvironment: 'jsdom', setupFilesAfterEnv };
"#,
        )
        .unwrap();
        // Member access on bindings is not evaluated, so the spread contributes nothing
        assert_eq!(value["testEnvironment"], "jsdom");
        assert_eq!(value["setupFiles"], json!(["a"]));
        assert_eq!(value["setupFilesAfterEnv"], json!(["./b.js"]));
    }

    #[test]
    fn test_require_resolve() {
        let value = eval(
            "jest.config.cjs",
            "module.exports = { setupFiles: [require.resolve('./setup'), require('path').join('x')] };",
        )
        .unwrap();
        assert_eq!(value, json!({"setupFiles": ["./setup", null]}));
    }

    #[test]
    fn test_named_exports() {
        let value = eval(
            "jest.config.js",
            "exports.preset = 'ts-jest'; exports.testEnvironment = 'node';",
        )
        .unwrap();
        assert_eq!(value, json!({"preset": "ts-jest", "testEnvironment": "node"}));
    }

    #[test]
    fn test_module_exports_then_member_assignment() {
        let value = eval(
            "jest.config.js",
            "module.exports = { bail: 1 }; module.exports.verbose = false;",
        )
        .unwrap();
        assert_eq!(value, json!({"bail": 1, "verbose": false}));
    }

    #[test]
    fn test_missing_export() {
        let err = eval("jest.config.js", "const config = { bail: 1 };").unwrap_err();
        assert!(matches!(err, LoadCause::MissingExport));
    }

    #[test]
    fn test_syntax_error() {
        let err = eval("jest.config.js", "module.exports = { bail: ;").unwrap_err();
        match err {
            LoadCause::Syntax(messages) => assert!(!messages.is_empty()),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_self_referencing_binding_terminates() {
        let value = eval("jest.config.js", "var a = b; var b = a; module.exports = a;").unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_binding_referring_to_itself_twice() {
        let value =
            eval("jest.config.js", "var a = [a, a]; module.exports = { setupFiles: a };").unwrap();
        assert_eq!(value, json!({"setupFiles": [null, null]}));
    }

    #[test]
    fn test_binding_reused_across_keys() {
        let value = eval(
            "jest.config.js",
            "const env = 'jsdom'; module.exports = { testEnvironment: env, other: env };",
        )
        .unwrap();
        assert_eq!(value, json!({"testEnvironment": "jsdom", "other": "jsdom"}));
    }

    #[test]
    fn test_doubling_bindings_stay_bounded() {
        let mut src = String::from("const a0 = 'x';\n");
        for n in 1..=26 {
            src.push_str(&format!("const a{} = [a{}, a{}];\n", n, n - 1, n - 1));
        }
        src.push_str("module.exports = { setupFiles: a26 };\n");

        let value = eval("jest.config.js", &src).unwrap();
        assert!(value["setupFiles"].is_array());
        let rendered = serde_json::to_string(&value).unwrap();
        assert!(rendered.len() < 6 * MAX_EVAL_NODES);
    }

    #[test]
    fn test_small_doubling_is_fully_evaluated() {
        let value = eval(
            "jest.config.js",
            "const a0 = 'x'; const a1 = [a0, a0]; const a2 = [a1, a1]; module.exports = a2;",
        )
        .unwrap();
        assert_eq!(value, json!([["x", "x"], ["x", "x"]]));
    }

    #[test]
    fn test_multi_argument_call_is_not_unwrapped() {
        let value = eval(
            "jest.config.js",
            "const base = { bail: true }; module.exports = merge(base, { testEnvironment: 'jsdom' });",
        )
        .unwrap();
        assert_eq!(value, Value::Null);
    }
}
