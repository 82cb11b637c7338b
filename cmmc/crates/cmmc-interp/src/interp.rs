//! The dispatch loop.
//!
//! Execution starts at line 0 with one initial frame; top-level
//! declarations live there. A `f=` header registers its function
//! and falls through to the jump that skips the body, except for
//! `main`, whose header and jump are skipped so execution falls
//! directly into the body. `_ra` is a distinguished global set by
//! the caller immediately before `c`; a user-function call pushes a
//! frame capturing the current `_ra`, and `r` pops the frame and
//! jumps to its captured return address. The initial `_ra` points
//! one past the end of the program, so `main`'s `r` halts the loop.

use std::io::Write;

use cmmc_ir::{Arg, Code, OpCode};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::error::RuntimeError;
use crate::stream::{InputStream, OutputStream};
use crate::value::{Kind, RtValue, Slot};

/// A function activation record.
pub struct Frame {
    /// Where `r` resumes, captured from `_ra` at call time.
    pub ra: usize,
    /// Live symbols of this activation, in creation order.
    pub locals: IndexMap<String, Slot>,
}

impl Frame {
    fn new(ra: usize) -> Self {
        Self {
            ra,
            locals: IndexMap::new(),
        }
    }
}

/// Executes an intermediate code list against three host streams.
pub struct Interpreter {
    codes: Vec<Code>,
    /// Function entry lines registered by executed `f=` headers.
    functions: FxHashMap<String, usize>,
    /// Frame stack; starts with the initial frame.
    stack: Vec<Frame>,
    /// Globals: `_ra`, `_rv` and the `_p<i>` argument slots.
    globals: IndexMap<String, Slot>,
    input: Box<dyn InputStream>,
    output: OutputStream,
    error: OutputStream,
}

impl Interpreter {
    /// Create an interpreter over the given code list and streams.
    pub fn new(
        codes: Vec<Code>,
        input: Box<dyn InputStream>,
        output: OutputStream,
        error: OutputStream,
    ) -> Self {
        let end = codes.len();
        let mut globals = IndexMap::new();
        globals.insert(
            "_ra".to_string(),
            Slot::Scalar {
                kind: Kind::Int,
                value: RtValue::Int(end as i64),
            },
        );
        globals.insert("_rv".to_string(), Slot::scalar(Kind::Real));
        Self {
            codes,
            functions: FxHashMap::default(),
            stack: vec![Frame::new(end)],
            globals,
            input,
            output,
            error,
        }
    }

    /// Run to completion or to the first runtime error.
    ///
    /// The error message is also written to the error stream.
    pub fn run(mut self) -> Result<(), RuntimeError> {
        match self.execute() {
            Ok(()) => Ok(()),
            Err(err) => {
                let _ = writeln!(self.error, "{}", err);
                Err(err)
            }
        }
    }

    fn execute(&mut self) -> Result<(), RuntimeError> {
        let mut pc = 0;
        while pc < self.codes.len() {
            let code = self.codes[pc].clone();
            match code.op {
                OpCode::Assign => self.exec_assign(&code)?,
                OpCode::ArrayStore => self.exec_array_store(&code)?,
                OpCode::ArrayLoad => self.exec_array_load(&code)?,
                OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div => {
                    self.exec_arith(&code)?
                }
                OpCode::Jump => {
                    pc = Self::target_line(&code)?;
                    continue;
                }
                OpCode::JumpLt | OpCode::JumpGt | OpCode::JumpEq | OpCode::JumpNe => {
                    // branch taken when the condition does NOT hold
                    if !self.cond_met(&code)? {
                        pc = Self::target_line(&code)?;
                        continue;
                    }
                }
                OpCode::FuncDef => {
                    let name = Self::target_name(&code)?;
                    if name == "main" {
                        // skip the header and its jump, fall into the body
                        pc += 2;
                        continue;
                    }
                    let entry = code.arg1.as_line().ok_or(RuntimeError::MalformedOp {
                        line: code.line,
                    })?;
                    self.functions.insert(name.to_string(), entry);
                }
                OpCode::ParamPass => {
                    let value = self.resolve(&code.arg1, code.line)?;
                    let name = Self::target_name(&code)?;
                    // argument slots are globally visible
                    self.globals.insert(name.to_string(), Slot::holding(value));
                }
                OpCode::ParamRecv => {
                    let value = self.resolve(&code.arg1, code.line)?;
                    let name = Self::target_name(&code)?.to_string();
                    self.store_scalar(&name, value, code.line)?;
                }
                OpCode::Call => {
                    pc = self.exec_call(&code)?;
                    continue;
                }
                OpCode::Ret => {
                    let frame = self
                        .stack
                        .pop()
                        .ok_or(RuntimeError::MalformedOp { line: code.line })?;
                    pc = frame.ra;
                    continue;
                }
            }
            pc += 1;
        }
        Ok(())
    }

    fn exec_assign(&mut self, code: &Code) -> Result<(), RuntimeError> {
        match &code.arg1 {
            Arg::Name(marker) if marker == "_i" || marker == "_f" => {
                let kind = if marker == "_i" { Kind::Int } else { Kind::Real };
                let name = Self::target_name(code)?.to_string();
                self.declare(name, Slot::scalar(kind));
                Ok(())
            }
            Arg::Name(marker) if marker == "_i[]" || marker == "_f[]" => {
                let kind = if marker == "_i[]" { Kind::Int } else { Kind::Real };
                let size = match code.arg2 {
                    Arg::Int(v) if v >= 0 => v as usize,
                    _ => return Err(RuntimeError::MalformedOp { line: code.line }),
                };
                let name = Self::target_name(code)?.to_string();
                self.declare(name, Slot::array(kind, size));
                Ok(())
            }
            _ => {
                let value = self.resolve(&code.arg1, code.line)?;
                let name = Self::target_name(code)?.to_string();
                self.store_scalar(&name, value, code.line)
            }
        }
    }

    fn exec_array_store(&mut self, code: &Code) -> Result<(), RuntimeError> {
        let index = self.index_value(&code.arg1, code.line)?;
        let value = self.resolve(&code.arg2, code.line)?;
        let name = Self::target_name(code)?.to_string();
        let line = code.line;
        match self.find_slot_mut(&name) {
            Some(Slot::Array { kind, data }) => {
                if index < 0 || index as usize >= data.len() {
                    return Err(RuntimeError::ArrayOutOfBounds { name, index, line });
                }
                let kind = *kind;
                data[index as usize] = value.coerce(kind);
                Ok(())
            }
            Some(_) => Err(RuntimeError::MalformedOp { line }),
            None => Err(RuntimeError::UnknownName { name, line }),
        }
    }

    fn exec_array_load(&mut self, code: &Code) -> Result<(), RuntimeError> {
        let name = match &code.arg1 {
            Arg::Name(name) => name.clone(),
            _ => return Err(RuntimeError::MalformedOp { line: code.line }),
        };
        let index = self.index_value(&code.arg2, code.line)?;
        let line = code.line;
        let value = match self.find_slot(&name) {
            Some(Slot::Array { data, .. }) => {
                if index < 0 || index as usize >= data.len() {
                    return Err(RuntimeError::ArrayOutOfBounds { name, index, line });
                }
                data[index as usize]
            }
            Some(_) => return Err(RuntimeError::MalformedOp { line }),
            None => return Err(RuntimeError::UnknownName { name, line }),
        };
        let target = Self::target_name(code)?.to_string();
        self.store_scalar(&target, value, line)
    }

    fn exec_arith(&mut self, code: &Code) -> Result<(), RuntimeError> {
        let a = self.resolve(&code.arg1, code.line)?;
        let b = self.resolve(&code.arg2, code.line)?;
        let line = code.line;

        let result = match (a, b) {
            (RtValue::Int(x), RtValue::Int(y)) => match code.op {
                OpCode::Add => RtValue::Int(x.wrapping_add(y)),
                OpCode::Sub => RtValue::Int(x.wrapping_sub(y)),
                OpCode::Mul => RtValue::Int(x.wrapping_mul(y)),
                OpCode::Div => {
                    if y == 0 {
                        return Err(RuntimeError::DivideByZero { line });
                    }
                    RtValue::Int(x.wrapping_div(y))
                }
                _ => return Err(RuntimeError::MalformedOp { line }),
            },
            _ => {
                let x = a.as_f64();
                let y = b.as_f64();
                match code.op {
                    OpCode::Add => RtValue::Real(x + y),
                    OpCode::Sub => RtValue::Real(x - y),
                    OpCode::Mul => RtValue::Real(x * y),
                    OpCode::Div => {
                        if y == 0.0 {
                            return Err(RuntimeError::DivideByZero { line });
                        }
                        RtValue::Real(x / y)
                    }
                    _ => return Err(RuntimeError::MalformedOp { line }),
                }
            }
        };

        let target = Self::target_name(code)?.to_string();
        self.store_scalar(&target, result, line)
    }

    fn cond_met(&self, code: &Code) -> Result<bool, RuntimeError> {
        let a = self.resolve(&code.arg1, code.line)?.as_f64();
        let b = self.resolve(&code.arg2, code.line)?.as_f64();
        match code.op {
            OpCode::JumpLt => Ok(a < b),
            OpCode::JumpGt => Ok(a > b),
            OpCode::JumpEq => Ok(a == b),
            OpCode::JumpNe => Ok(a != b),
            _ => Err(RuntimeError::MalformedOp { line: code.line }),
        }
    }

    /// Dispatch a `c` op; returns the new program counter.
    fn exec_call(&mut self, code: &Code) -> Result<usize, RuntimeError> {
        let name = Self::target_name(code)?;
        match name {
            "write" => {
                let value = match self.find_slot("_p0") {
                    Some(Slot::Scalar { value, .. }) => *value,
                    _ => {
                        return Err(RuntimeError::UnknownName {
                            name: "_p0".to_string(),
                            line: code.line,
                        })
                    }
                };
                writeln!(self.output, "{}", value)?;
                self.output.flush()?;
                self.ra_value(code.line)
            }
            "read" => {
                let text = self
                    .input
                    .read_line()
                    .ok_or(RuntimeError::EofOnRead { line: code.line })?;
                let trimmed = text.trim();
                let value = if let Ok(v) = trimmed.parse::<i64>() {
                    RtValue::Int(v)
                } else if let Ok(v) = trimmed.parse::<f64>() {
                    RtValue::Real(v)
                } else {
                    return Err(RuntimeError::InvalidInput {
                        input: trimmed.to_string(),
                        line: code.line,
                    });
                };
                self.globals.insert("_rv".to_string(), Slot::holding(value));
                self.ra_value(code.line)
            }
            _ => {
                let entry =
                    *self
                        .functions
                        .get(name)
                        .ok_or_else(|| RuntimeError::UnknownName {
                            name: name.to_string(),
                            line: code.line,
                        })?;
                let ra = self.ra_value(code.line)?;
                self.stack.push(Frame::new(ra));
                Ok(entry)
            }
        }
    }

    /// Current value of the `_ra` global.
    fn ra_value(&self, line: usize) -> Result<usize, RuntimeError> {
        match self.find_slot("_ra") {
            Some(Slot::Scalar { value, .. }) => Ok(value.as_i64() as usize),
            _ => Err(RuntimeError::UnknownName {
                name: "_ra".to_string(),
                line,
            }),
        }
    }

    /// Resolve an operand: a literal, or a scalar by name in the top
    /// frame or the globals.
    fn resolve(&self, arg: &Arg, line: usize) -> Result<RtValue, RuntimeError> {
        match arg {
            Arg::Int(v) => Ok(RtValue::Int(*v)),
            Arg::Real(v) => Ok(RtValue::Real(*v)),
            Arg::Name(name) => match self.find_slot(name) {
                Some(Slot::Scalar { value, .. }) => Ok(*value),
                _ => Err(RuntimeError::UnknownName {
                    name: name.clone(),
                    line,
                }),
            },
            _ => Err(RuntimeError::MalformedOp { line }),
        }
    }

    /// Subscript operand: a literal or an int-valued variable.
    fn index_value(&self, arg: &Arg, line: usize) -> Result<i64, RuntimeError> {
        match arg {
            Arg::Int(v) => Ok(*v),
            Arg::Name(_) => Ok(self.resolve(arg, line)?.as_i64()),
            _ => Err(RuntimeError::MalformedOp { line }),
        }
    }

    fn find_slot(&self, name: &str) -> Option<&Slot> {
        self.stack
            .last()
            .and_then(|frame| frame.locals.get(name))
            .or_else(|| self.globals.get(name))
    }

    fn find_slot_mut(&mut self, name: &str) -> Option<&mut Slot> {
        if let Some(frame) = self.stack.last_mut() {
            if frame.locals.contains_key(name) {
                return frame.locals.get_mut(name);
            }
        }
        self.globals.get_mut(name)
    }

    /// Allocate in the top frame, or in the globals if the frame
    /// stack is empty.
    fn declare(&mut self, name: String, slot: Slot) {
        match self.stack.last_mut() {
            Some(frame) => {
                frame.locals.insert(name, slot);
            }
            None => {
                self.globals.insert(name, slot);
            }
        }
    }

    /// Write a scalar: coerce to the destination's declared kind,
    /// creating the destination typed after the value if absent.
    fn store_scalar(&mut self, name: &str, value: RtValue, line: usize) -> Result<(), RuntimeError> {
        match self.find_slot_mut(name) {
            Some(Slot::Scalar {
                kind,
                value: stored,
            }) => {
                *stored = value.coerce(*kind);
                Ok(())
            }
            Some(Slot::Array { .. }) => Err(RuntimeError::MalformedOp { line }),
            None => {
                self.declare(name.to_string(), Slot::holding(value));
                Ok(())
            }
        }
    }

    fn target_name(code: &Code) -> Result<&str, RuntimeError> {
        match &code.target {
            Arg::Name(name) => Ok(name),
            _ => Err(RuntimeError::MalformedOp { line: code.line }),
        }
    }

    fn target_line(code: &Code) -> Result<usize, RuntimeError> {
        code.target
            .as_line()
            .ok_or(RuntimeError::MalformedOp { line: code.line })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmmc_ir::Emitter;
    use cmmc_lex::{Lexer, StrSource};
    use cmmc_par::Parser;
    use cmmc_util::Handler;
    use std::sync::{Arc, Mutex};

    /// Output sink that keeps its contents readable after the run.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("lock")).to_string()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn run_source(source: &str, input: &str) -> (Result<(), RuntimeError>, String) {
        let handler = Handler::new();
        let lexer = Lexer::new(StrSource::new(source), &handler);
        let mut parser = Parser::new(lexer, &handler);
        let program = parser.parse().expect("parse failed");
        let codes = Emitter::new().emit_program(&program);

        let out = SharedBuf::default();
        let interp = Interpreter::new(
            codes,
            Box::new(crate::StringInput::new(input)),
            Box::new(out.clone()),
            Box::new(std::io::sink()),
        );
        (interp.run(), out.contents())
    }

    fn run_ok(source: &str, input: &str) -> String {
        let (result, output) = run_source(source, input);
        result.expect("runtime error");
        output
    }

    #[test]
    fn test_write_constant_expression() {
        assert_eq!(run_ok("void main(void){ write(1 + 2); }", ""), "3\n");
    }

    #[test]
    fn test_while_loop_counts() {
        let output = run_ok(
            "void main(void){ int i; i = 0; while(i < 3){ write(i); i = i + 1; } }",
            "",
        );
        assert_eq!(output, "0\n1\n2\n");
    }

    #[test]
    fn test_recursive_factorial() {
        let output = run_ok(
            "int fact(int n){ if(n < 2){ return 1; } return n * fact(n - 1); } \
             void main(void){ write(fact(5)); }",
            "",
        );
        assert_eq!(output, "120\n");
    }

    #[test]
    fn test_array_init_and_load() {
        let output = run_ok(
            "void main(void){ int[3] a = {10, 20, 30}; write(a[2]); }",
            "",
        );
        assert_eq!(output, "30\n");
    }

    #[test]
    fn test_variable_subscript() {
        let output = run_ok(
            "void main(void){ int[3] a = {5, 6, 7}; int i; i = 1; write(a[i]); }",
            "",
        );
        assert_eq!(output, "6\n");
    }

    #[test]
    fn test_if_else_branches() {
        let source = "void main(void){ int x; x = 2; \
                      if(x == 2){ write(1); } else { write(0); } \
                      if(x > 5){ write(1); } else { write(0); } }";
        assert_eq!(run_ok(source, ""), "1\n0\n");
    }

    #[test]
    fn test_nequal_condition() {
        let source = "void main(void){ int x; x = 1; if(x <> 2){ write(9); } }";
        assert_eq!(run_ok(source, ""), "9\n");
    }

    #[test]
    fn test_integer_division_truncates() {
        assert_eq!(run_ok("void main(void){ write(7 / 2); }", ""), "3\n");
    }

    #[test]
    fn test_real_arithmetic() {
        assert_eq!(run_ok("void main(void){ write(1.5 + 1.5); }", ""), "3.0\n");
    }

    #[test]
    fn test_int_slot_truncates_on_write() {
        let output = run_ok("void main(void){ int x; x = 7 / 2; write(x); }", "");
        assert_eq!(output, "3\n");
    }

    #[test]
    fn test_nested_calls() {
        let output = run_ok(
            "int add(int a, int b){ return a + b; } \
             void main(void){ write(add(1, add(2, 3))); }",
            "",
        );
        assert_eq!(output, "6\n");
    }

    #[test]
    fn test_read_feeds_program() {
        let output = run_ok(
            "void main(void){ int x; x = read(); write(x + 1); }",
            "41\n",
        );
        assert_eq!(output, "42\n");
    }

    #[test]
    fn test_read_real_input() {
        let output = run_ok("void main(void){ real y; y = read(); write(y); }", "2.5\n");
        assert_eq!(output, "2.5\n");
    }

    #[test]
    fn test_divide_by_zero() {
        let (result, _) = run_source("void main(void){ write(1 / 0); }", "");
        assert!(matches!(result, Err(RuntimeError::DivideByZero { .. })));
    }

    #[test]
    fn test_load_out_of_bounds() {
        let (result, _) = run_source("void main(void){ int[3] a; write(a[5]); }", "");
        assert!(matches!(
            result,
            Err(RuntimeError::ArrayOutOfBounds { index: 5, .. })
        ));
    }

    #[test]
    fn test_store_out_of_bounds() {
        let (result, _) = run_source("void main(void){ int[2] a; a[2] = 1; }", "");
        assert!(matches!(
            result,
            Err(RuntimeError::ArrayOutOfBounds { index: 2, .. })
        ));
    }

    #[test]
    fn test_eof_on_read() {
        let (result, _) = run_source("void main(void){ int x; x = read(); }", "");
        assert!(matches!(result, Err(RuntimeError::EofOnRead { .. })));
    }

    #[test]
    fn test_unparsable_input() {
        let (result, _) = run_source("void main(void){ int x; x = read(); }", "pear\n");
        assert!(matches!(result, Err(RuntimeError::InvalidInput { .. })));
    }

    #[test]
    fn test_globals_live_in_initial_frame() {
        let output = run_ok("int g; void main(void){ g = 5; write(g); }", "");
        assert_eq!(output, "5\n");
    }

    #[test]
    fn test_locals_are_per_call() {
        // each activation gets its own n
        let output = run_ok(
            "int down(int n){ if(n > 0){ write(n); n = down(n - 1); } return 0; } \
             void main(void){ n = down(3); }",
            "",
        );
        assert_eq!(output, "3\n2\n1\n");
    }

    #[test]
    fn test_error_written_to_error_stream() {
        let handler = Handler::new();
        let lexer = Lexer::new(
            StrSource::new("void main(void){ write(1 / 0); }"),
            &handler,
        );
        let mut parser = Parser::new(lexer, &handler);
        let program = parser.parse().expect("parse failed");
        let codes = Emitter::new().emit_program(&program);

        let err_buf = SharedBuf::default();
        let interp = Interpreter::new(
            codes,
            Box::new(crate::StringInput::new("")),
            Box::new(std::io::sink()),
            Box::new(err_buf.clone()),
        );
        assert!(interp.run().is_err());
        assert!(err_buf.contents().contains("divide-by-zero"));
    }
}
