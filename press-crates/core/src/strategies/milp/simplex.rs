//! A dense-tableau primal simplex for the linear relaxation of a [`Problem`].
//!
//! The objective is always to minimise the sum of the structural variables, which are
//! implicitly non-negative. Rows are turned into equalities with slack (`<=`) and surplus (`>=`)
//! variables; rows which do not admit an initial basic slack receive an artificial variable.
//!
//! Artificial variables are driven out with a symbolic big-M: every reduced cost is kept as a
//! pair `(penalty, cost)`, where the penalty part counts the artificial variables, and pairs are
//! compared lexicographically. This is a single phase; a relaxation which ends with a positive
//! artificial variable in the basis is reported as infeasible.
use crate::model::Problem;

/// Tolerance used when comparing reduced costs and ratios.
pub const EPSILON: f64 = 1e-9;
/// A basic artificial variable above this value means the relaxation is infeasible.
pub const ARTIFICIAL_TOLERANCE: f64 = 1e-6;
/// The number of pivots after which the simplex gives up.
pub const MAX_SIMPLEX_ITERATIONS: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    Equal,
    LessOrEqual,
    GreaterOrEqual,
}

impl Relation {
    /// The relation after multiplying both sides by `-1`.
    fn negated(self) -> Relation {
        match self {
            Relation::Equal => Relation::Equal,
            Relation::LessOrEqual => Relation::GreaterOrEqual,
            Relation::GreaterOrEqual => Relation::LessOrEqual,
        }
    }
}

/// `coefficients · x  relation  rhs`
#[derive(Clone, Debug, PartialEq)]
pub struct LinearConstraint {
    pub coefficients: Vec<f64>,
    pub relation: Relation,
    pub rhs: f64,
}

impl LinearConstraint {
    /// A bound `x[variable] relation value` over `num_variables` variables.
    pub fn bound(variable: usize, num_variables: usize, relation: Relation, value: f64) -> Self {
        let mut coefficients = vec![0.0; num_variables];
        coefficients[variable] = 1.0;

        LinearConstraint {
            coefficients,
            relation,
            rhs: value,
        }
    }

    /// Ensures a non-negative right-hand side.
    fn normalised(&self) -> LinearConstraint {
        if self.rhs >= 0.0 {
            return self.clone();
        }

        LinearConstraint {
            coefficients: self.coefficients.iter().map(|&a| -a).collect(),
            relation: self.relation.negated(),
            rhs: -self.rhs,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SimplexOutcome {
    Optimal { value: f64, solution: Vec<f64> },
    Infeasible,
    Unbounded,
    IterationLimit,
}

/// Minimise `sum(x)` subject to the constraints and `x >= 0`.
#[derive(Clone, Debug)]
pub struct LinearProgram {
    num_variables: usize,
    constraints: Vec<LinearConstraint>,
}

impl LinearProgram {
    pub fn new(num_variables: usize) -> LinearProgram {
        LinearProgram {
            num_variables,
            constraints: vec![],
        }
    }

    /// One equality row per slot: the presses of its affecting buttons sum to its target.
    pub fn from_problem(problem: &Problem) -> LinearProgram {
        let mut program = LinearProgram::new(problem.num_buttons());

        for slot in problem.slots() {
            let coefficients = problem
                .buttons()
                .map(|button| if button.mask().contains(slot) { 1.0 } else { 0.0 })
                .collect();
            program.add_constraint(LinearConstraint {
                coefficients,
                relation: Relation::Equal,
                rhs: problem.target(slot) as f64,
            });
        }

        program
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        crate::press_assert_eq_simple!(constraint.coefficients.len(), self.num_variables);
        self.constraints.push(constraint);
    }

    /// A copy of this program with the additional constraints appended.
    pub fn with_constraints<'a>(
        &self,
        constraints: impl IntoIterator<Item = &'a LinearConstraint>,
    ) -> LinearProgram {
        let mut program = self.clone();
        for constraint in constraints {
            program.add_constraint(constraint.clone());
        }
        program
    }

    pub fn solve(&self) -> SimplexOutcome {
        self.solve_within(MAX_SIMPLEX_ITERATIONS)
    }

    /// Solves the program with at most `max_iterations` pivots.
    pub fn solve_within(&self, max_iterations: usize) -> SimplexOutcome {
        let Some(mut tableau) = Tableau::new(self) else {
            return SimplexOutcome::Infeasible;
        };

        for _ in 0..max_iterations {
            let Some(entering) = tableau.entering_column() else {
                return tableau.extract();
            };
            let Some(leaving) = tableau.leaving_row(entering) else {
                return SimplexOutcome::Unbounded;
            };
            tableau.pivot(leaving, entering);
        }

        SimplexOutcome::IterationLimit
    }
}

#[derive(Debug)]
struct Tableau {
    num_structural: usize,
    rows: Vec<Vec<f64>>,
    rhs: Vec<f64>,
    /// The basic column of every row.
    basis: Vec<usize>,
    is_artificial: Vec<bool>,
    /// Reduced costs of the original objective.
    cost: Vec<f64>,
    /// Reduced costs of the big-M part, which dominates `cost`.
    penalty: Vec<f64>,
}

impl Tableau {
    /// Builds the initial tableau, or returns [`None`] if some equality row is trivially
    /// violated.
    fn new(program: &LinearProgram) -> Option<Tableau> {
        let constraints = program
            .constraints
            .iter()
            .map(LinearConstraint::normalised)
            .collect::<Vec<_>>();

        if constraints.iter().any(|constraint| {
            constraint.relation == Relation::Equal
                && constraint.rhs.abs() > EPSILON
                && constraint.coefficients.iter().all(|a| a.abs() <= EPSILON)
        }) {
            return None;
        }

        let num_structural = program.num_variables;
        let num_slack = constraints
            .iter()
            .filter(|constraint| constraint.relation != Relation::Equal)
            .count();
        let num_artificial = constraints
            .iter()
            .filter(|constraint| constraint.relation != Relation::LessOrEqual)
            .count();
        let num_columns = num_structural + num_slack + num_artificial;

        let mut tableau = Tableau {
            num_structural,
            rows: Vec::with_capacity(constraints.len()),
            rhs: Vec::with_capacity(constraints.len()),
            basis: Vec::with_capacity(constraints.len()),
            is_artificial: vec![false; num_columns],
            cost: vec![0.0; num_columns],
            penalty: vec![0.0; num_columns],
        };
        tableau.cost[..num_structural].fill(1.0);

        let mut next_slack = num_structural;
        let mut next_artificial = num_structural + num_slack;
        for constraint in constraints {
            let mut row = vec![0.0; num_columns];
            row[..num_structural].copy_from_slice(&constraint.coefficients);

            let basic = match constraint.relation {
                Relation::LessOrEqual => {
                    row[next_slack] = 1.0;
                    next_slack += 1;
                    next_slack - 1
                }
                Relation::GreaterOrEqual => {
                    row[next_slack] = -1.0;
                    next_slack += 1;
                    row[next_artificial] = 1.0;
                    next_artificial += 1;
                    next_artificial - 1
                }
                Relation::Equal => {
                    row[next_artificial] = 1.0;
                    next_artificial += 1;
                    next_artificial - 1
                }
            };

            if basic >= num_structural + num_slack {
                tableau.is_artificial[basic] = true;
                tableau.penalty[basic] = 1.0;
            }

            tableau.rows.push(row);
            tableau.rhs.push(constraint.rhs);
            tableau.basis.push(basic);
        }

        // price out the artificial variables which start in the basis
        for (row, &basic) in tableau.rows.iter().zip(&tableau.basis) {
            if tableau.is_artificial[basic] {
                for (penalty, &a) in tableau.penalty.iter_mut().zip(row) {
                    *penalty -= a;
                }
            }
        }

        Some(tableau)
    }

    /// The column with the most negative reduced cost, comparing `(penalty, cost)`
    /// lexicographically; the lowest column index wins ties. [`None`] means optimal.
    fn entering_column(&self) -> Option<usize> {
        let mut entering: Option<(usize, f64, f64)> = None;

        for (column, (&penalty, &cost)) in self.penalty.iter().zip(&self.cost).enumerate() {
            let penalty_improves = penalty < -EPSILON;
            if !penalty_improves && !(penalty.abs() <= EPSILON && cost < -EPSILON) {
                continue;
            }
            let penalty = if penalty_improves { penalty } else { 0.0 };

            let is_better = match entering {
                None => true,
                Some((_, best_penalty, best_cost)) => {
                    penalty < best_penalty - EPSILON
                        || ((penalty - best_penalty).abs() <= EPSILON && cost < best_cost - EPSILON)
                }
            };
            if is_better {
                entering = Some((column, penalty, cost));
            }
        }

        entering.map(|(column, _, _)| column)
    }

    /// The row attaining the minimum ratio test for `column`; the lowest row index wins ties.
    /// [`None`] means the column is unbounded.
    fn leaving_row(&self, column: usize) -> Option<usize> {
        let mut leaving: Option<(usize, f64)> = None;

        for (index, (row, &rhs)) in self.rows.iter().zip(&self.rhs).enumerate() {
            if row[column] <= EPSILON {
                continue;
            }

            let ratio = rhs / row[column];
            if leaving.is_none_or(|(_, best_ratio)| ratio < best_ratio - EPSILON) {
                leaving = Some((index, ratio));
            }
        }

        leaving.map(|(index, _)| index)
    }

    fn pivot(&mut self, pivot_row: usize, pivot_column: usize) {
        let pivot = self.rows[pivot_row][pivot_column];
        for a in self.rows[pivot_row].iter_mut() {
            *a /= pivot;
        }
        self.rhs[pivot_row] /= pivot;

        let normalised = self.rows[pivot_row].clone();
        let normalised_rhs = self.rhs[pivot_row];

        for (index, (row, rhs)) in self.rows.iter_mut().zip(self.rhs.iter_mut()).enumerate() {
            let factor = row[pivot_column];
            if index == pivot_row || factor == 0.0 {
                continue;
            }
            eliminate(row, &normalised, factor);
            *rhs -= factor * normalised_rhs;
        }

        let factor = self.cost[pivot_column];
        eliminate(&mut self.cost, &normalised, factor);
        let factor = self.penalty[pivot_column];
        eliminate(&mut self.penalty, &normalised, factor);

        self.basis[pivot_row] = pivot_column;
    }

    fn extract(&self) -> SimplexOutcome {
        let artificial_remains = self
            .basis
            .iter()
            .zip(&self.rhs)
            .any(|(&basic, &rhs)| self.is_artificial[basic] && rhs > ARTIFICIAL_TOLERANCE);
        if artificial_remains {
            return SimplexOutcome::Infeasible;
        }

        let mut solution = vec![0.0; self.num_structural];
        for (&basic, &rhs) in self.basis.iter().zip(&self.rhs) {
            if basic < self.num_structural {
                solution[basic] = rhs.max(0.0);
            }
        }

        SimplexOutcome::Optimal {
            value: solution.iter().sum(),
            solution,
        }
    }
}

/// `row -= factor * pivot_row`
fn eliminate(row: &mut [f64], pivot_row: &[f64], factor: f64) {
    if factor == 0.0 {
        return;
    }
    for (a, &p) in row.iter_mut().zip(pivot_row) {
        *a -= factor * p;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn optimal(outcome: SimplexOutcome) -> (f64, Vec<f64>) {
        match outcome {
            SimplexOutcome::Optimal { value, solution } => (value, solution),
            other => panic!("expected an optimal relaxation, got {other:?}"),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    fn equality(coefficients: Vec<f64>, rhs: f64) -> LinearConstraint {
        LinearConstraint {
            coefficients,
            relation: Relation::Equal,
            rhs,
        }
    }

    #[test]
    fn relaxation_of_a_problem_with_unique_solution() {
        let problem = Problem::new(vec![vec![0, 1], vec![1]], vec![3, 5]).unwrap();

        let (value, solution) = optimal(LinearProgram::from_problem(&problem).solve());

        assert_close(value, 5.0);
        assert_close(solution[0], 3.0);
        assert_close(solution[1], 2.0);
    }

    #[test]
    fn relaxation_can_be_fractional() {
        let problem =
            Problem::new(vec![vec![0, 1], vec![1, 2], vec![0, 2]], vec![1, 1, 1]).unwrap();

        let (value, solution) = optimal(LinearProgram::from_problem(&problem).solve());

        assert_close(value, 1.5);
        for x in solution {
            assert_close(x, 0.5);
        }
    }

    #[test]
    fn pivot_budget_is_respected() {
        let program =
            LinearProgram::from_problem(&Problem::new(vec![vec![0, 1], vec![1]], vec![3, 5]).unwrap());

        assert_eq!(program.solve_within(0), SimplexOutcome::IterationLimit);
        assert_eq!(program.solve_within(1), SimplexOutcome::IterationLimit);
        let (value, _) = optimal(program.solve_within(MAX_SIMPLEX_ITERATIONS));
        assert_close(value, 5.0);
    }

    #[test]
    fn contradicting_equalities_are_infeasible() {
        let mut program = LinearProgram::new(1);
        program.add_constraint(equality(vec![1.0], 1.0));
        program.add_constraint(equality(vec![1.0], 2.0));

        assert_eq!(program.solve(), SimplexOutcome::Infeasible);
    }

    #[test]
    fn empty_equality_with_positive_rhs_is_infeasible() {
        let mut program = LinearProgram::new(1);
        program.add_constraint(equality(vec![0.0], 3.0));

        assert_eq!(program.solve(), SimplexOutcome::Infeasible);
    }

    #[test]
    fn negative_rhs_is_normalised() {
        let mut program = LinearProgram::new(1);
        program.add_constraint(equality(vec![-1.0], -2.0));

        let (value, _) = optimal(program.solve());
        assert_close(value, 2.0);
    }

    #[test]
    fn bounds_are_respected() {
        let mut program = LinearProgram::new(2);
        program.add_constraint(LinearConstraint {
            coefficients: vec![1.0, 1.0],
            relation: Relation::GreaterOrEqual,
            rhs: 3.0,
        });
        program.add_constraint(LinearConstraint::bound(0, 2, Relation::GreaterOrEqual, 2.5));
        program.add_constraint(LinearConstraint::bound(1, 2, Relation::LessOrEqual, 4.0));

        let (value, solution) = optimal(program.solve());

        assert_close(value, 3.0);
        assert!(solution[0] >= 2.5 - 1e-6);
    }

    #[test]
    fn only_upper_bounds_give_the_zero_solution() {
        let mut program = LinearProgram::new(2);
        program.add_constraint(LinearConstraint::bound(0, 2, Relation::LessOrEqual, 4.0));

        let (value, solution) = optimal(program.solve());

        assert_close(value, 0.0);
        assert_eq!(solution, vec![0.0, 0.0]);
    }
}
