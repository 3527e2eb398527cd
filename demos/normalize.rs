use eqsolve::prelude::{norm, simp};

fn main() {
    let raw = "|x − 1|^2 = 4";
    println!("normalize {raw} => {}", norm(raw));

    let expr = "x*(x+1) - x^2";
    match simp(expr) {
        Ok(result) => println!("simplify {expr} => {result}"),
        Err(err) => eprintln!("parse error for {expr}: {err}"),
    }
}
