//! Chain executor
//!
//! Walks the optimal split tree in postorder, multiplying subchains into
//! pooled buffers. Intermediate results live on a LIFO stack; `on_stack[i]`
//! records that position `i` is now represented by a stack entry rather
//! than by the original factor.

use log::debug;

use super::options::ProductOptions;
use super::planner::ChainOptimizer;
use super::table::CostTable;
use crate::builtins::scratch::Pool;
use crate::error::{ProductError, Result};
use crate::{Dense, Matrix};

/// Execution statistics for one walk
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Pairwise products computed
    pub multiplications: usize,

    /// Scalar multiplies actually performed
    pub scalar_ops: usize,

    /// Buffers borrowed from the pool
    pub acquired: usize,

    /// Intermediate buffers handed back to the pool
    pub released: usize,

    /// Deepest the result stack got
    pub peak_stack: usize,
}

/// An operand resolved for one multiplication
enum Operand<'a> {
    /// Original input, never mutated or released
    Factor(&'a dyn Matrix),
    /// Popped intermediate, owned until released
    Loaned(Dense),
}

impl Operand<'_> {
    fn matrix(&self) -> &dyn Matrix {
        match self {
            Operand::Factor(m) => *m,
            Operand::Loaned(m) => m as &dyn Matrix,
        }
    }

    fn is_loaned(&self) -> bool {
        matches!(self, Operand::Loaned(_))
    }
}

/// Work item for the explicit postorder walk
enum Frame {
    Visit(usize, usize),
    Combine(usize, usize),
}

/// Evaluates an optimized chain
pub struct Executor<'a, P: Pool + ?Sized> {
    factors: &'a [&'a dyn Matrix],
    table: &'a CostTable,
    pool: &'a mut P,
    options: ProductOptions,

    stack: Vec<Dense>,
    on_stack: Vec<bool>,

    stats: ExecutionStats,
}

impl<'a, P: Pool + ?Sized> Executor<'a, P> {
    /// Executor over an optimizer whose `optimize` has run
    ///
    /// Verbosity comes from the optimizer's [`ProductOptions`], so one
    /// product call is traced consistently end to end.
    pub fn new(optimizer: &'a ChainOptimizer<'a>, pool: &'a mut P) -> Self {
        let factors = optimizer.factors();
        Executor {
            factors,
            table: optimizer.table(),
            pool,
            options: optimizer.options(),
            stack: Vec::new(),
            on_stack: vec![false; factors.len()],
            stats: ExecutionStats::default(),
        }
    }

    /// Evaluate the whole chain
    ///
    /// The returned matrix is on loan from the pool; the caller copies it
    /// out and releases it. On error every loaned buffer is already back
    /// in the pool. A single-factor chain yields a pooled copy of it.
    pub fn multiply(mut self) -> Result<(Dense, ExecutionStats)> {
        let n = self.factors.len();
        if n == 1 {
            let only = self.factors[0];
            let (r, c) = only.dims();
            let mut m = self.pool.acquire(r, c, false);
            self.stats.acquired += 1;
            m.copy_from(only);
            return Ok((m, self.stats));
        }

        if let Err(e) = self.walk(0, n - 1) {
            self.drain();
            return Err(e);
        }

        let result = match self.stack.len() {
            1 => self.stack.remove(0),
            depth => {
                self.drain();
                return Err(ProductError::Invariant(format!(
                    "walk left {} results on the stack",
                    depth
                )));
            }
        };
        if self.options.tracing() {
            let (r, c) = result.dims();
            debug!("\tpop result ({}×{}) cost={}", r, c, self.table.at(0, n - 1).cost);
        }
        Ok((result, self.stats))
    }

    /// Postorder walk of `[i, j]` with an explicit work stack
    fn walk(&mut self, i: usize, j: usize) -> Result<()> {
        let mut work = vec![Frame::Visit(i, j)];
        while let Some(frame) = work.pop() {
            match frame {
                // A single factor stays where it is until `operand` picks it up.
                Frame::Visit(i, j) if i == j => {}
                Frame::Visit(i, j) => {
                    let k = self.table.at(i, j).split;
                    work.push(Frame::Combine(i, j));
                    work.push(Frame::Visit(k + 1, j));
                    work.push(Frame::Visit(i, k));
                }
                Frame::Combine(i, j) => self.combine(i, j)?,
            }
        }
        Ok(())
    }

    /// Multiply the already-resolved halves of `[i, j]`
    fn combine(&mut self, i: usize, j: usize) -> Result<()> {
        // The right half was pushed last, so it is popped first.
        let b = self.operand(j)?;
        let a = match self.operand(i) {
            Ok(a) => a,
            Err(e) => {
                self.give_back(b);
                return Err(e);
            }
        };
        let (ar, ac) = a.matrix().dims();
        let (br, bc) = b.matrix().dims();

        if ac != br {
            self.give_back(a);
            self.give_back(b);
            return Err(ProductError::Invariant(format!(
                "subchain [{}, {}]: {}×{} cannot multiply {}×{}",
                i,
                j,
                ar,
                ac,
                br,
                bc
            )));
        }

        if self.options.tracing() {
            debug!(
                "\tpush f[{}] ({}×{}){} * f[{}] ({}×{}){}",
                i,
                ar,
                ac,
                popped(a.is_loaned()),
                j,
                br,
                bc,
                popped(b.is_loaned())
            );
        }

        let mut r = self.pool.acquire(ar, bc, false);
        self.stats.acquired += 1;
        let res = r.mul(a.matrix(), b.matrix());
        self.give_back(a);
        self.give_back(b);
        if let Err(e) = res {
            self.pool.release(r);
            self.stats.released += 1;
            return Err(ProductError::Invariant(format!("subchain [{}, {}]: {}", i, j, e)));
        }

        self.stats.multiplications += 1;
        self.stats.scalar_ops += ar * ac * bc;
        self.push(r, i, j);
        Ok(())
    }

    fn push(&mut self, m: Dense, i: usize, j: usize) {
        self.on_stack[i] = true;
        self.on_stack[j] = true;
        self.stack.push(m);
        self.stats.peak_stack = self.stats.peak_stack.max(self.stack.len());
    }

    /// Position `i` as an operand: the stack top if merged, else the input
    fn operand(&mut self, i: usize) -> Result<Operand<'a>> {
        if !self.on_stack[i] {
            return Ok(Operand::Factor(self.factors[i]));
        }
        self.stack.pop().map(Operand::Loaned).ok_or_else(|| {
            ProductError::Invariant(format!("position {} marked merged but stack is empty", i))
        })
    }

    /// Return a popped intermediate to the pool; inputs are left alone
    fn give_back(&mut self, op: Operand<'_>) {
        if let Operand::Loaned(m) = op {
            self.pool.release(m);
            self.stats.released += 1;
        }
    }

    fn drain(&mut self) {
        while let Some(m) = self.stack.pop() {
            self.pool.release(m);
            self.stats.released += 1;
        }
    }

    #[cfg(test)]
    fn stack_len(&self) -> usize {
        self.stack.len()
    }
}

fn popped(on_stack: bool) -> &'static str {
    if on_stack {
        " (popped result)"
    } else {
        ""
    }
}
