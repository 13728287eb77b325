use std::collections::HashMap;

use validate_links::runner;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    // Variables that are not valid Unicode cannot carry settings and are skipped
    let env: HashMap<String, String> = std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect();

    std::process::exit(runner::run(args, env).await);
}
