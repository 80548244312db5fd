pub mod scheduled_price_sweep;
