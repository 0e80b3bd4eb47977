/// Binary operators.
///
/// Every operator lowers to a named function when the tree is substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Comparison
    /// Equal (`==`)
    Equal,
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,

    // Arithmetic
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
}

impl BinOp {
    /// Name of the function this operator lowers to.
    pub fn function_name(self) -> &'static str {
        match self {
            BinOp::Equal => "eq",
            BinOp::LessThan => "lt",
            BinOp::GreaterThan => "gt",
            BinOp::LessEqual => "lte",
            BinOp::GreaterEqual => "gte",
            BinOp::Add => "add",
            BinOp::Subtract => "subtract",
            BinOp::Multiply => "multiply",
            BinOp::Divide => "divide",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Equal => "==",
            BinOp::LessThan => "<",
            BinOp::GreaterThan => ">",
            BinOp::LessEqual => "<=",
            BinOp::GreaterEqual => ">=",
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Equal
                | BinOp::LessThan
                | BinOp::GreaterThan
                | BinOp::LessEqual
                | BinOp::GreaterEqual
        )
    }
}
