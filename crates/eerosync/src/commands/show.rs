//! Read-only handlers: run one sync cycle and print part of the snapshot.

use serde::Serialize;
use tabled::Tabled;

use eerosync_core::{Account, BackupNetwork, Client, Device, Network, NightlightMode, Profile};

use crate::cli::{ClientsArgs, ClientsCommand, GlobalOpts, ResourceArgs, ResourceCommand};
use crate::commands::{Context, util};
use crate::error::CliError;
use crate::output::{self, detail_lines, or_dash, paint_status, yes_no};

// ── Account ─────────────────────────────────────────────────────────

fn account_detail(a: &Account) -> String {
    detail_lines(&[
        ("ID", or_dash(a.id())),
        ("Name", or_dash(a.name())),
        ("Email", or_dash(a.email())),
        ("Phone", or_dash(a.phone())),
        ("Log ID", or_dash(a.log_id())),
        ("Premium", or_dash(a.premium_status())),
        ("Networks", a.networks().len().to_string()),
        ("Fetched", or_dash(a.fetched_at().map(|t| t.to_rfc3339()))),
    ])
}

pub async fn account(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let account = ctx.sync().await?;
    let out = output::render_single(
        &global.output,
        account.data(),
        |_| account_detail(&account),
        |_| account.id().unwrap_or_default().to_owned(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Networks ────────────────────────────────────────────────────────

#[derive(Clone, Serialize, Tabled)]
struct NetworkRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Clients")]
    clients: usize,
    #[tabled(rename = "Gateway")]
    gateway: String,
    #[tabled(rename = "Premium")]
    premium: String,
    #[tabled(rename = "Public IP")]
    public_ip: String,
}

impl NetworkRow {
    fn new(n: Network<'_>, color: bool) -> Self {
        Self {
            id: n.id().into(),
            name: n.name_unique(),
            ssid: or_dash(n.ssid()),
            status: paint_status(n.status().unwrap_or("-"), color),
            clients: n.connected_clients_count(),
            gateway: or_dash(n.gateway_name()),
            premium: or_dash(n.premium_status()),
            public_ip: or_dash(n.public_ip()),
        }
    }
}

fn network_detail(n: Network<'_>) -> String {
    let (down, down_unit) = n.speed_down();
    let (up, up_unit) = n.speed_up();
    let speed = |value: Option<f64>, unit: Option<&str>| match value {
        Some(v) => format!("{v:.1} {}", unit.unwrap_or_default()),
        None => "-".into(),
    };
    let firmware = n.target_firmware();
    detail_lines(&[
        ("ID", n.id().into()),
        ("Name", or_dash(n.name())),
        ("Nickname", or_dash(n.nickname())),
        ("SSID", or_dash(n.ssid())),
        ("Status", or_dash(n.status())),
        ("Timezone", or_dash(n.timezone())),
        ("Location", format!("{}, {}", or_dash(n.city()), or_dash(n.region_name()))),
        ("ISP", or_dash(n.isp())),
        ("Public IP", or_dash(n.public_ip())),
        ("Internet", or_dash(n.health_internet_status())),
        ("Speed down", speed(down, down_unit)),
        ("Speed up", speed(up, up_unit)),
        ("Speed test", or_dash(n.speed_date())),
        ("Premium", or_dash(n.premium_status())),
        ("Ad block", n.ad_block_status().to_string()),
        ("Guest network", yes_no(n.guest_network_enabled())),
        ("Guest SSID", or_dash(n.guest_network_name())),
        ("Band steering", yes_no(n.band_steering())),
        ("SQM", yes_no(n.sqm())),
        ("UPnP", yes_no(n.upnp())),
        ("WPA3", yes_no(n.wpa3())),
        ("IPv6 upstream", yes_no(n.ipv6_upstream())),
        ("DNS caching", yes_no(n.dns_caching())),
        ("Thread", yes_no(n.thread_enabled())),
        ("Update hour", or_dash(n.preferred_update_hour())),
        ("Target firmware", or_dash(firmware.os_version())),
        ("Gateway", or_dash(n.gateway_name())),
        ("Eeros", n.devices().len().to_string()),
        ("Profiles", n.profiles().len().to_string()),
        (
            "Clients",
            format!(
                "{} connected ({} guest) of {}",
                n.connected_clients_count(),
                n.connected_guest_clients_count(),
                or_dash(n.clients_count())
            ),
        ),
    ])
}

pub async fn networks(ctx: &Context, args: ResourceArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let account = ctx.sync().await?;
    let color = output::should_color(&global.color);
    let out = match args.command {
        ResourceCommand::List(list) => {
            let rows: Vec<NetworkRow> = util::networks(&account, &list)?
                .into_iter()
                .map(|n| NetworkRow::new(n, color))
                .collect();
            output::render_list(&global.output, &rows, Clone::clone, |r| r.id.clone())
        }
        ResourceCommand::Get { id } => {
            let n = util::network(&account, &id)?;
            output::render_single(&global.output, n.data(), |_| network_detail(n), |_| id.clone())
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Devices (eero units) ────────────────────────────────────────────

#[derive(Clone, Serialize, Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Location")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Gateway")]
    gateway: String,
    #[tabled(rename = "Clients")]
    clients: String,
    #[tabled(rename = "Firmware")]
    firmware: String,
    #[tabled(rename = "Network")]
    network: String,
}

impl DeviceRow {
    fn new(d: Device<'_>, color: bool) -> Self {
        Self {
            id: d.id().into(),
            name: or_dash(d.name()),
            model: or_dash(d.model()),
            status: paint_status(d.status().unwrap_or("-"), color),
            gateway: yes_no(d.is_gateway()),
            clients: or_dash(d.connected_clients_count()),
            firmware: or_dash(d.os_version()),
            network: d.network().id().into(),
        }
    }
}

fn device_detail(d: Device<'_>) -> String {
    let mut pairs = vec![
        ("ID", d.id().to_owned()),
        ("Name", d.name_long()),
        ("Model", or_dash(d.model())),
        ("Model number", or_dash(d.model_number())),
        ("MAC", or_dash(d.mac_address())),
        ("Serial", or_dash(d.serial())),
        ("Status", or_dash(d.status())),
        ("Gateway", yes_no(d.is_gateway())),
        ("Firmware", or_dash(d.os_version())),
        ("Update available", yes_no(d.update_available())),
        ("Support expired", yes_no(d.support_expired())),
        ("Status light", yes_no(d.status_light_enabled())),
        ("Brightness", or_dash(d.status_light_brightness())),
        ("Clients", d.connected_clients_names().join(", ")),
    ];
    if let Some(light) = d.nightlight() {
        let schedule = match (light.schedule_on(), light.schedule_off()) {
            (Some(on), Some(off)) => format!("{} - {}", on.format("%H:%M"), off.format("%H:%M")),
            _ => "-".into(),
        };
        pairs.push(("Nightlight", light.mode().to_string()));
        if light.mode() != NightlightMode::Disabled {
            pairs.push(("Nightlight level", or_dash(light.brightness_percentage())));
        }
        pairs.push(("Nightlight schedule", schedule));
    }
    detail_lines(&pairs)
}

pub async fn devices(ctx: &Context, args: ResourceArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let account = ctx.sync().await?;
    let color = output::should_color(&global.color);
    let out = match args.command {
        ResourceCommand::List(list) => {
            let rows: Vec<DeviceRow> = util::networks(&account, &list)?
                .into_iter()
                .flat_map(|n| n.devices())
                .map(|d| DeviceRow::new(d, color))
                .collect();
            output::render_list(&global.output, &rows, Clone::clone, |r| r.id.clone())
        }
        ResourceCommand::Get { id } => {
            let d = util::device(&account, &id)?;
            output::render_single(&global.output, d.data(), |_| device_detail(d), |_| id.clone())
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Clients ─────────────────────────────────────────────────────────

#[derive(Clone, Serialize, Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Connected")]
    connected: String,
    #[tabled(rename = "Via")]
    connection: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Eero")]
    eero: String,
}

impl From<Client<'_>> for ClientRow {
    fn from(c: Client<'_>) -> Self {
        Self {
            id: c.id().into(),
            name: c.name().unwrap_or("Unknown").into(),
            connected: yes_no(c.connected()),
            connection: or_dash(c.connection_type()),
            category: or_dash(c.device_category()),
            ip: or_dash(c.ip()),
            mac: or_dash(c.mac()),
            eero: or_dash(c.source_location()),
        }
    }
}

fn client_detail(c: Client<'_>) -> String {
    let mut pairs = vec![
        ("ID", c.id().to_owned()),
        ("Name", c.name_connection_type()),
        ("Nickname", or_dash(c.nickname())),
        ("Hostname", or_dash(c.hostname())),
        ("MAC", or_dash(c.mac())),
        ("IP", or_dash(c.ip())),
        ("Manufacturer", or_dash(c.manufacturer())),
        ("Type", or_dash(c.device_type())),
        ("Category", or_dash(c.device_category())),
        ("Connected", yes_no(c.connected())),
        ("Guest", yes_no(c.is_guest())),
        ("Paused", yes_no(c.paused())),
        ("Last active", or_dash(c.last_active().map(|t| t.to_rfc3339()))),
        ("Eero", or_dash(c.source_location())),
    ];
    if c.wireless() == Some(true) {
        let (signal, unit) = c.signal();
        let (frequency, frequency_unit) = c.interface_frequency();
        pairs.push(("Signal", format!("{} {}", or_dash(signal), unit.unwrap_or_default())));
        pairs.push(("Bars", or_dash(c.score_bars())));
        pairs.push(("Channel", or_dash(c.channel())));
        pairs.push((
            "Band",
            format!("{} {}", or_dash(frequency), frequency_unit.unwrap_or_default()),
        ));
        pairs.push(("Width rx/tx", format!(
            "{} / {}",
            or_dash(c.channel_width_rx()),
            or_dash(c.channel_width_tx())
        )));
    }
    detail_lines(&pairs)
}

pub async fn clients(ctx: &Context, args: ClientsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let account = ctx.sync().await?;
    let out = match args.command {
        ClientsCommand::List { list, connected } => {
            let rows: Vec<ClientRow> = util::networks(&account, &list)?
                .into_iter()
                .flat_map(|n| n.clients())
                .filter(|c| !connected || c.connected() == Some(true))
                .map(ClientRow::from)
                .collect();
            output::render_list(&global.output, &rows, Clone::clone, |r| r.id.clone())
        }
        ClientsCommand::Get { id } => {
            let c = util::client(&account, &id)?;
            output::render_single(&global.output, c.data(), |_| client_detail(c), |_| id.clone())
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Profiles ────────────────────────────────────────────────────────

#[derive(Clone, Serialize, Tabled)]
struct ProfileRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Paused")]
    paused: String,
    #[tabled(rename = "Connected")]
    connected: usize,
    #[tabled(rename = "Ad block")]
    ad_block: String,
    #[tabled(rename = "Network")]
    network: String,
}

impl From<Profile<'_>> for ProfileRow {
    fn from(p: Profile<'_>) -> Self {
        Self {
            id: p.id().into(),
            name: or_dash(p.name()),
            paused: yes_no(p.paused()),
            connected: p.connected_clients_count(),
            ad_block: yes_no(Some(p.ad_block())),
            network: p.network().id().into(),
        }
    }
}

fn profile_detail(p: Profile<'_>) -> String {
    let mut apps = p.blocked_applications();
    apps.sort_unstable();
    detail_lines(&[
        ("ID", p.id().to_owned()),
        ("Name", p.name_long()),
        ("Paused", yes_no(p.paused())),
        ("Ad block", yes_no(Some(p.ad_block()))),
        ("Blocked apps", if apps.is_empty() { "-".into() } else { apps.join(", ") }),
        ("Clients", p.connected_clients_names().join(", ")),
        ("Last active", or_dash(p.last_active().map(|t| t.to_rfc3339()))),
    ])
}

pub async fn profiles(ctx: &Context, args: ResourceArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let account = ctx.sync().await?;
    let out = match args.command {
        ResourceCommand::List(list) => {
            let rows: Vec<ProfileRow> = util::networks(&account, &list)?
                .into_iter()
                .flat_map(|n| n.profiles())
                .map(ProfileRow::from)
                .collect();
            output::render_list(&global.output, &rows, Clone::clone, |r| r.id.clone())
        }
        ResourceCommand::Get { id } => {
            let p = util::profile(&account, &id)?;
            output::render_single(&global.output, p.data(), |_| profile_detail(p), |_| id.clone())
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Backup networks ─────────────────────────────────────────────────

#[derive(Clone, Serialize, Tabled)]
struct BackupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Auto-join")]
    auto_join: String,
    #[tabled(rename = "Network")]
    network: String,
}

impl From<BackupNetwork<'_>> for BackupRow {
    fn from(b: BackupNetwork<'_>) -> Self {
        Self {
            id: or_dash(b.id()),
            ssid: or_dash(b.ssid()),
            status: or_dash(b.status()),
            auto_join: yes_no(b.auto_join_enabled()),
            network: b.network().id().into(),
        }
    }
}

fn backup_detail(b: BackupNetwork<'_>) -> String {
    detail_lines(&[
        ("ID", or_dash(b.id())),
        ("SSID", or_dash(b.ssid())),
        ("Auto-join", yes_no(b.auto_join_enabled())),
        ("Status", or_dash(b.status())),
        ("Failure", or_dash(b.failure_reason())),
        ("Checked", or_dash(b.checked())),
        ("Created", or_dash(b.created())),
        ("Updated", or_dash(b.last_updated_at())),
    ])
}

pub async fn backups(ctx: &Context, args: ResourceArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let account = ctx.sync().await?;
    let out = match args.command {
        ResourceCommand::List(list) => {
            let rows: Vec<BackupRow> = util::networks(&account, &list)?
                .into_iter()
                .flat_map(|n| n.backup_networks())
                .map(BackupRow::from)
                .collect();
            output::render_list(&global.output, &rows, Clone::clone, |r| r.id.clone())
        }
        ResourceCommand::Get { id } => {
            let b = util::backup(&account, &id)?;
            output::render_single(&global.output, b.data(), |_| backup_detail(b), |_| id.clone())
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
