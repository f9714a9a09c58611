use std::process::ExitCode;

fn main() -> ExitCode {
    match subscription_manager_lib::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("アプリケーションを終了します: {}", e.details());
            eprintln!("{}", e.user_message());
            eprintln!("{}", e.details());
            ExitCode::FAILURE
        }
    }
}
