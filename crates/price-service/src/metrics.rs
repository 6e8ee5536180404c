use metrics::{Counter, counter, describe_counter};
use std::sync::LazyLock;

const GAS_CYCLES: &str = "relay.price_service.gas_cycles";
const GAS_CYCLES_HELP: &str = "Number of completed gas price refresh cycles";

const GAS_CYCLE_FAILURES: &str = "relay.price_service.gas_cycle_failures";
const GAS_CYCLE_FAILURES_HELP: &str = "Number of gas price refresh cycles aborted by an error";

const TOKEN_CYCLES: &str = "relay.price_service.token_cycles";
const TOKEN_CYCLES_HELP: &str = "Number of completed token price refresh cycles";

const TOKEN_CYCLE_FAILURES: &str = "relay.price_service.token_cycle_failures";
const TOKEN_CYCLE_FAILURES_HELP: &str = "Number of token price refresh cycles aborted by an error";

const CYCLES_SKIPPED: &str = "relay.price_service.cycles_skipped";
const CYCLES_SKIPPED_HELP: &str =
    "Number of refresh cycles skipped because no dynamic config was delivered yet";

static DESCRIBE: LazyLock<()> = LazyLock::new(|| {
    describe_counter!(GAS_CYCLES, GAS_CYCLES_HELP);
    describe_counter!(GAS_CYCLE_FAILURES, GAS_CYCLE_FAILURES_HELP);
    describe_counter!(TOKEN_CYCLES, TOKEN_CYCLES_HELP);
    describe_counter!(TOKEN_CYCLE_FAILURES, TOKEN_CYCLE_FAILURES_HELP);
    describe_counter!(CYCLES_SKIPPED, CYCLES_SKIPPED_HELP);
});

fn gas_cycles() -> Counter {
    LazyLock::force(&DESCRIBE);
    counter!(GAS_CYCLES)
}

pub(crate) fn inc_gas_cycles() {
    gas_cycles().increment(1);
}

fn gas_cycle_failures() -> Counter {
    LazyLock::force(&DESCRIBE);
    counter!(GAS_CYCLE_FAILURES)
}

pub(crate) fn inc_gas_cycle_failures() {
    gas_cycle_failures().increment(1);
}

fn token_cycles() -> Counter {
    LazyLock::force(&DESCRIBE);
    counter!(TOKEN_CYCLES)
}

pub(crate) fn inc_token_cycles() {
    token_cycles().increment(1);
}

fn token_cycle_failures() -> Counter {
    LazyLock::force(&DESCRIBE);
    counter!(TOKEN_CYCLE_FAILURES)
}

pub(crate) fn inc_token_cycle_failures() {
    token_cycle_failures().increment(1);
}

fn cycles_skipped() -> Counter {
    LazyLock::force(&DESCRIBE);
    counter!(CYCLES_SKIPPED)
}

pub(crate) fn inc_cycles_skipped() {
    cycles_skipped().increment(1);
}
