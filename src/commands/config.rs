// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{
    get_currency_symbol, get_default_user, pretty_table, set_currency_symbol, set_default_user,
};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let rows = vec![
                vec!["default_user".into(), get_default_user(conn)?],
                vec!["currency_symbol".into(), get_currency_symbol(conn)?],
            ];
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        Some(("set-user", sub)) => {
            let v = sub.get_one::<String>("value").context("value missing")?;
            set_default_user(conn, v)?;
            println!("Default user set to '{}'", v.trim());
        }
        Some(("set-currency", sub)) => {
            let v = sub.get_one::<String>("value").context("value missing")?;
            set_currency_symbol(conn, v)?;
            println!("Currency symbol set to '{}'", v.trim());
        }
        _ => {}
    }
    Ok(())
}
