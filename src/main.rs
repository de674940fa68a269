// src/main.rs
//
// Exploratory driver for the multigrid Poisson solver.
//
// Sets up a dipole right-hand side (+1 / -1 impulse pair, homogeneous
// Dirichlet boundaries), runs FMG, and optionally polishes with extra
// V-cycles while recording the residual history.
//
// Outputs are written to `runs/<run_id>/` (or the directory given via
// `out=`) and are not committed to version control.
//
// Examples:
//
//   cargo run --release -- size=128 tol=1e-3 plot
//       -> 128x128 dipole solve, saving the solution heatmap.
//
//   cargo run --release -- size=256 h0=0.5 nuv=3 cycles=5
//       -> deeper FMG schedule plus 5 extra V-cycles, with the
//          residual after each cycle appended to residuals.csv.
//
// Typical outputs (per run directory):
//   runs/<run_id>/
//     ├── config.json
//     ├── residuals.csv
//     └── u.png               (if `plot` is enabled)

use std::env;
use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use poisson_mg::config::{GridConfig, RunConfig, RunInfo, SolverConfig, SolverParams};
use poisson_mg::multigrid::{MultigridPoisson, OMEGA};
use poisson_mg::visualisation::save_field_plot;

fn parse_kv(args: &[String], key: &str) -> Option<String> {
    let prefix = format!("{key}=");
    args.iter()
        .find_map(|a| a.strip_prefix(&prefix).map(|v| v.to_string()))
}

fn parse_usize(args: &[String], key: &str, default: usize) -> usize {
    parse_kv(args, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_f64(args: &[String], key: &str, default: f64) -> f64 {
    parse_kv(args, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let size = parse_usize(&args, "size", 128);
    let h0 = parse_f64(&args, "h0", 1.0);
    let tolerance = parse_f64(&args, "tol", 1e-3);
    let extra_cycles = parse_usize(&args, "cycles", 0);
    let out_root = parse_kv(&args, "out").unwrap_or_else(|| "runs".to_string());
    let plot = args.iter().any(|a| a == "plot");

    let params = SolverParams {
        nu1: parse_usize(&args, "nu1", 2),
        nu2: parse_usize(&args, "nu2", 2),
        nu_v: parse_usize(&args, "nuv", 2),
    };

    let mut solver = match MultigridPoisson::with_setup(
        (size, size),
        h0,
        Default::default(),
        params,
    ) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("[mg] construction failed: {e}");
            std::process::exit(1);
        }
    };
    eprintln!(
        "[mg] {}x{} grid, {} levels, omega={:.6}",
        size,
        size,
        solver.level_count(),
        OMEGA
    );

    // Dipole right-hand side: one positive and one negative impulse on
    // the horizontal midline.
    let (w, h) = (size as isize, size as isize);
    let b = solver.b0_mut();
    b.set(w / 4, h / 2, 1.0);
    b.set(3 * w / 4, h / 2, -1.0);

    let run_id = {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        format!("dipole_{size}x{size}_{now}")
    };
    let out_dir = PathBuf::from(&out_root).join(&run_id);
    if let Err(e) = create_dir_all(&out_dir) {
        eprintln!("[mg] cannot create {}: {e}", out_dir.display());
        std::process::exit(1);
    }

    let config = RunConfig {
        grid: GridConfig {
            width: size,
            height: size,
            h0,
        },
        solver: SolverConfig {
            nu1: params.nu1,
            nu2: params.nu2,
            nu_v: params.nu_v,
            tolerance,
            omega: OMEGA,
        },
        run: RunInfo {
            binary: "poisson-mg".to_string(),
            run_id: run_id.clone(),
        },
    };
    if let Err(e) = config.write_to_dir(&out_dir) {
        eprintln!("[mg] failed to write config.json: {e}");
    }

    let residual = match solver.solve(tolerance) {
        Ok(r) => {
            eprintln!("[mg] fmg done: linf={:.3e} mse={:.3e}", r.linf, r.mse);
            r
        }
        Err(e) => {
            eprintln!("[mg] {e}");
            std::process::exit(1);
        }
    };

    // Residual history: the FMG result, then one row per extra V-cycle.
    let csv_path = out_dir.join("residuals.csv");
    let history_result = (|| -> std::io::Result<()> {
        let mut csv = BufWriter::new(File::create(&csv_path)?);
        writeln!(csv, "cycle,linf,mse")?;
        writeln!(csv, "0,{:.6e},{:.6e}", residual.linf, residual.mse)?;

        for cycle in 1..=extra_cycles {
            if let Err(e) = solver.v_cycle(0) {
                eprintln!("[mg] v-cycle failed: {e}");
                break;
            }
            match solver.compute_residual(0) {
                Ok(r) => {
                    eprintln!("[mg] v-cycle {cycle}: linf={:.3e} mse={:.3e}", r.linf, r.mse);
                    writeln!(csv, "{cycle},{:.6e},{:.6e}", r.linf, r.mse)?;
                }
                Err(e) => {
                    eprintln!("[mg] residual failed: {e}");
                    break;
                }
            }
        }
        Ok(())
    })();
    if let Err(e) = history_result {
        eprintln!("[mg] failed to write residuals.csv: {e}");
    }

    if plot {
        let png = out_dir.join("u.png");
        match save_field_plot(
            solver.u0(),
            "solution u (blue = min, white = mid, red = max)",
            png.to_str().unwrap_or("u.png"),
        ) {
            Ok(()) => eprintln!("[mg] wrote {}", png.display()),
            Err(e) => eprintln!("[mg] plot failed: {e}"),
        }
    }

    println!("{}", out_dir.display());
}
