use csv::Writer;
use fiado::market::Market;
use fiado::script;
use std::error::Error;
use std::ffi::OsString;
use std::fs::File;
use std::{env, io};

fn get_first_arg() -> Result<OsString, Box<dyn Error>> {
    match env::args_os().nth(1) {
        None => Err(From::from("expect 1 argument, but got none")),
        Some(file_path) => Ok(file_path),
    }
}

fn run_script(market: &mut Market, file: File) -> Result<(), Box<dyn Error>> {
    for line in script::run(market, file) {
        println!("{line}");
    }

    Ok(())
}

fn output_balances(market: &Market) -> Result<(), Box<dyn Error>> {
    let mut writer = Writer::from_writer(io::stdout());
    for row in market.open_balances() {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    fiado::init_tracing();

    let mut market = Market::new();
    run_script(&mut market, File::open(get_first_arg()?)?)?;
    output_balances(&market)?;

    Ok(())
}
