//! Structured description of a generated Verilog module.
//!
//! Generators assemble an [`HdlModule`] through [`ModuleBuilder`] instead of
//! printing text directly, so the reset/aux/strategy variations stay in data:
//! the reset style is stored once on the module and applied uniformly to
//! every [`ClockedBlock`] by the renderer in [`render`].
//!
//! Every module built here has the same clocking skeleton:
//!
//! - `i_clk` rising edge drives all registers
//! - optional reset port chosen by [`ResetMode`]
//! - `i_ce` clock enable, which gates every clocked block

pub mod render;

use crate::types::ResetMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetKind {
    Wire,
    Reg,
}

/// A module port. `range` is the bit range text, e.g. `(PW-1):0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    pub direction: Direction,
    pub kind: NetKind,
    pub range: Option<String>,
}

impl Port {
    pub fn input(name: &str, range: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            direction: Direction::Input,
            kind: NetKind::Wire,
            range: range.map(str::to_string),
        }
    }

    pub fn output(name: &str, kind: NetKind, range: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            direction: Direction::Output,
            kind,
            range: range.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: u32,
    pub comment: String,
}

/// Internal storage declared inside the module body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Reg { name: String, range: Option<String> },
    Wire { name: String, range: Option<String> },
    /// `reg [range] name [0:(depth)-1]`; `depth` is a constant expression
    Memory {
        name: String,
        range: String,
        depth: String,
    },
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Reg { name, .. }
            | Declaration::Wire { name, .. }
            | Declaration::Memory { name, .. } => name,
        }
    }
}

/// Statement inside a clocked block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Comment(String),
    /// `lhs <= rhs;`
    Assign { lhs: String, rhs: String },
    If {
        cond: String,
        then: Vec<Stmt>,
        otherwise: Vec<Stmt>,
    },
}

impl Stmt {
    pub fn comment(text: &str) -> Self {
        Stmt::Comment(text.to_string())
    }

    pub fn assign(lhs: &str, rhs: &str) -> Self {
        Stmt::Assign {
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
        }
    }

    pub fn if_else(cond: &str, then: Vec<Stmt>, otherwise: Vec<Stmt>) -> Self {
        Stmt::If {
            cond: cond.to_string(),
            then,
            otherwise,
        }
    }
}

/// One `always @(posedge i_clk)` process.
///
/// `reset` lists the assignments made while reset is asserted; they are
/// ignored when the module has no reset. `body` runs on clock-enabled cycles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClockedBlock {
    pub reset: Vec<Stmt>,
    pub body: Vec<Stmt>,
}

impl ClockedBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear `target` to zero on reset
    pub fn clears(mut self, target: &str) -> Self {
        self.reset.push(Stmt::assign(target, "0"));
        self
    }

    pub fn stmt(mut self, stmt: Stmt) -> Self {
        self.body.push(stmt);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdlModule {
    pub name: String,
    pub reset: ResetMode,
    pub ports: Vec<Port>,
    pub parameters: Vec<Parameter>,
    pub declarations: Vec<Declaration>,
    /// `(hex file, memory)` pairs loaded with `$readmemh`
    pub memory_inits: Vec<(String, String)>,
    /// Continuous `assign lhs = rhs;`
    pub assigns: Vec<(String, String)>,
    pub blocks: Vec<ClockedBlock>,
}

impl HdlModule {
    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }

    pub fn port_names(&self) -> Vec<&str> {
        self.ports.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name() == name)
    }
}

pub struct ModuleBuilder {
    module: HdlModule,
}

impl ModuleBuilder {
    /// Start a module with the standard clock, reset and clock-enable ports.
    pub fn new(name: &str, reset: ResetMode) -> Self {
        let mut ports = vec![Port::input("i_clk", None)];
        if let Some(reset_port) = reset.port_name() {
            ports.push(Port::input(reset_port, None));
        }
        ports.push(Port::input("i_ce", None));

        Self {
            module: HdlModule {
                name: name.to_string(),
                reset,
                ports,
                parameters: Vec::new(),
                declarations: Vec::new(),
                memory_inits: Vec::new(),
                assigns: Vec::new(),
                blocks: Vec::new(),
            },
        }
    }

    pub fn port(mut self, port: Port) -> Self {
        self.module.ports.push(port);
        self
    }

    /// Add `port` only when `include` is set.
    pub fn port_if(self, include: bool, port: Port) -> Self {
        if include {
            self.port(port)
        } else {
            self
        }
    }

    pub fn parameter(mut self, name: &str, value: u32, comment: &str) -> Self {
        self.module.parameters.push(Parameter {
            name: name.to_string(),
            value,
            comment: comment.to_string(),
        });
        self
    }

    /// The `PW`/`OW` parameter pair every lookup module declares.
    pub fn width_parameters(self, phase_width: u32, output_width: u32) -> Self {
        self.parameter("PW", phase_width, "Number of bits in the input phase")
            .parameter("OW", output_width, "Number of output bits")
    }

    pub fn reg(mut self, name: &str, range: Option<&str>) -> Self {
        self.module.declarations.push(Declaration::Reg {
            name: name.to_string(),
            range: range.map(str::to_string),
        });
        self
    }

    pub fn wire(mut self, name: &str, range: Option<&str>) -> Self {
        self.module.declarations.push(Declaration::Wire {
            name: name.to_string(),
            range: range.map(str::to_string),
        });
        self
    }

    /// Declare a memory and load it from `<module name>.hex` at startup.
    pub fn table_memory(mut self, name: &str, range: &str, depth: &str) -> Self {
        self.module.declarations.push(Declaration::Memory {
            name: name.to_string(),
            range: range.to_string(),
            depth: depth.to_string(),
        });
        let file = crate::hexfile::hex_file_name(&self.module.name);
        self.module.memory_inits.push((file, name.to_string()));
        self
    }

    pub fn assign(mut self, lhs: &str, rhs: &str) -> Self {
        self.module.assigns.push((lhs.to_string(), rhs.to_string()));
        self
    }

    pub fn clocked(mut self, block: ClockedBlock) -> Self {
        self.module.blocks.push(block);
        self
    }

    pub fn build(self) -> HdlModule {
        self.module
    }
}
