use eqsolve::prelude::{solve, solve_for};

fn main() {
    let equations = ["2x = 8", "x^2 + 2x - 10 = 0", "|x - 3| = 5", "x^3 = 8", "1/x = 2"];

    for equation in equations {
        match solve(equation) {
            Ok(result) => println!("{equation} => {result}"),
            Err(err) => eprintln!("{equation}: {err}"),
        }
    }

    match solve_for("2x + 3y = 12", "y") {
        Ok(result) => println!("2x + 3y = 12 (for y) => {result}"),
        Err(err) => eprintln!("2x + 3y = 12: {err}"),
    }
}
