//! The four-address op model.

use std::fmt;

/// Operation of an intermediate op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    /// `=` copy or typed declaration
    Assign,
    /// `[]=` array store: `target[arg1] = arg2`
    ArrayStore,
    /// `=[]` array load: `target = arg1[arg2]`
    ArrayLoad,
    /// `+` arithmetic
    Add,
    /// `-` arithmetic
    Sub,
    /// `*` arithmetic
    Mul,
    /// `/` arithmetic
    Div,
    /// `j` unconditional jump to line `target`
    Jump,
    /// `j<` jump to `target` when `arg1 < arg2` is false
    JumpLt,
    /// `j>` jump to `target` when `arg1 > arg2` is false
    JumpGt,
    /// `j==` jump to `target` when `arg1 == arg2` is false
    JumpEq,
    /// `j<>` jump to `target` when `arg1 <> arg2` is false
    JumpNe,
    /// `f=` function header: `arg1` entry line, `target` name
    FuncDef,
    /// `c` call the function named in `target`
    Call,
    /// `r` return through the frame's return address
    Ret,
    /// `p=` caller stages an argument into `target` slot
    ParamPass,
    /// `=p` callee copies slot `arg1` into `target`
    ParamRecv,
}

impl OpCode {
    /// The mnemonic used in IR listings.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            OpCode::Assign => "=",
            OpCode::ArrayStore => "[]=",
            OpCode::ArrayLoad => "=[]",
            OpCode::Add => "+",
            OpCode::Sub => "-",
            OpCode::Mul => "*",
            OpCode::Div => "/",
            OpCode::Jump => "j",
            OpCode::JumpLt => "j<",
            OpCode::JumpGt => "j>",
            OpCode::JumpEq => "j==",
            OpCode::JumpNe => "j<>",
            OpCode::FuncDef => "f=",
            OpCode::Call => "c",
            OpCode::Ret => "r",
            OpCode::ParamPass => "p=",
            OpCode::ParamRecv => "=p",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// One field of an op: empty, a literal, a name, or a line number.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Empty,
    Int(i64),
    Real(f64),
    Name(String),
    Line(usize),
}

impl Arg {
    /// Convenience constructor for name fields.
    pub fn name(name: impl AsRef<str>) -> Self {
        Arg::Name(name.as_ref().to_string())
    }

    /// The line number, if this field holds one.
    pub fn as_line(&self) -> Option<usize> {
        match self {
            Arg::Line(line) => Some(*line),
            _ => None,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Empty => Ok(()),
            Arg::Int(value) => write!(f, "{}", value),
            Arg::Real(value) => write!(f, "{:?}", value),
            Arg::Name(name) => f.write_str(name),
            Arg::Line(line) => write!(f, "{}", line),
        }
    }
}

/// A four-address op with its final line number.
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub line: usize,
    pub op: OpCode,
    pub arg1: Arg,
    pub arg2: Arg,
    pub target: Arg,
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:3}: ( {:<3} , {:<5} , {:<5} , {:<8} )",
            self.line,
            self.op.to_string(),
            self.arg1.to_string(),
            self.arg2.to_string(),
            self.target.to_string(),
        )
    }
}

/// Render a code list as the IR listing, one op per line.
pub fn render_codes(codes: &[Code]) -> String {
    let mut out = String::new();
    for code in codes {
        out.push_str(&code.to_string());
        out.push('\n');
    }
    out
}
