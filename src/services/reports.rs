// src/services/reports.rs

// Montagem dos relatórios a partir das dobras de `analytics`.
// Funções puras: o ReportService busca os dados e chama estas funções.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    analytics::{
        ClientDirectory, CouponReport, DirectoryEntry, DirectoryFilter, OverviewReport,
        RevenueReport, UnregisteredClient,
    },
    booking::{Booking, BookingDetail, ClientKey},
    coupon::Coupon,
    period::ReportPeriod,
    user::RegisteredUser,
};
use crate::services::analytics::{
    average, client_segments, client_totals, coupon_split, daily_buckets, order_count,
    peak_weekday, percentage, product_table, rank_clients, revenue_growth, total_revenue,
    total_units, weekday_buckets,
};

const TOP_PRODUCTS: usize = 10;

fn ratio(part: u32, whole: u32) -> Decimal {
    average(Decimal::from(part), whole)
}

// =============================================================================
//  VISÃO GERAL
// =============================================================================

/// Usuários cadastrados no período + usuários que compraram no período.
/// `purchasers` vem dos `cabinet_id` dos registros; telefone ausente no perfil
/// é completado com o telefone do registro.
pub fn build_overview(
    period: ReportPeriod,
    bookings: &[Booking],
    registered_in_period: Vec<RegisteredUser>,
    purchasers: Vec<RegisteredUser>,
) -> OverviewReport {
    let phones: HashMap<Uuid, &str> = bookings
        .iter()
        .filter(|b| !b.is_canceled() && !b.phone.is_empty())
        .filter_map(|b| b.cabinet_id.map(|id| (id, b.phone.as_str())))
        .collect();

    let mut seen: HashSet<Uuid> = HashSet::new();
    let registered_users: Vec<RegisteredUser> = registered_in_period
        .into_iter()
        .chain(purchasers)
        .filter(|u| seen.insert(u.id))
        .map(|mut u| {
            if u.number.as_deref().is_none_or(|n| n.trim().is_empty()) {
                if let Some(phone) = phones.get(&u.id) {
                    u.number = Some(phone.to_string());
                }
            }
            u
        })
        .collect();

    // Cliente com qualquer registro ligado a um cadastro não é convidado
    let registered_keys: HashSet<ClientKey> = bookings
        .iter()
        .filter(|b| !b.is_canceled() && b.is_registered())
        .map(Booking::client_key)
        .collect();

    let mut guest_keys: HashSet<ClientKey> = HashSet::new();
    let unregistered_users: Vec<UnregisteredClient> = bookings
        .iter()
        .filter(|b| !b.is_canceled() && !b.is_registered())
        .filter(|b| {
            let key = b.client_key();
            !registered_keys.contains(&key) && guest_keys.insert(key)
        })
        .map(|b| UnregisteredClient {
            name: b.name.clone(),
            phone: b.phone.clone(),
        })
        .collect();

    let split = coupon_split(bookings);
    let registered_clients = registered_users.len() as u32;
    let non_registered_clients = unregistered_users.len() as u32;

    OverviewReport {
        period: period.into(),
        total_clients: registered_clients + non_registered_clients,
        registered_clients,
        non_registered_clients,
        registered_users,
        unregistered_users,
        clients: rank_clients(client_totals(bookings)),
        products: product_table(bookings),
        purchases_with_coupon: split.orders_with_coupon,
        purchases_without_coupon: split.orders_without_coupon,
        products_sold_with_coupon: split.units_with_coupon,
        products_sold_without_coupon: split.units_without_coupon,
        total_revenue: total_revenue(bookings),
    }
}

// =============================================================================
//  RECEITA
// =============================================================================

pub fn build_revenue_report(
    period: ReportPeriod,
    bookings: &[Booking],
    previous_bookings: &[Booking],
    existing_before: &HashSet<ClientKey>,
) -> RevenueReport {
    let revenue = total_revenue(bookings);
    let previous_revenue = total_revenue(previous_bookings);
    let orders = order_count(bookings);
    let units = total_units(bookings);
    let coupons = coupon_split(bookings);
    let customers = client_segments(bookings, existing_before);

    RevenueReport {
        period: period.into(),
        previous_period: period.previous().into(),
        total_revenue: revenue,
        previous_revenue,
        revenue_growth_rate: revenue_growth(revenue, previous_revenue),
        total_units_sold: units,
        total_orders: orders,
        average_order_value: average(revenue, orders),
        average_selling_price: average(revenue, units),
        avg_items_per_order: ratio(units, orders),
        products: product_table(bookings),
        avg_units_per_customer: ratio(units, customers.unique),
        avg_discount_amount: average(coupons.total_discount, coupons.orders_with_coupon),
        coupons,
        revenue_per_customer: average(revenue, customers.unique),
        registered_percentage: percentage(
            Decimal::from(customers.registered),
            Decimal::from(customers.unique),
        ),
        customers,
        clients: rank_clients(client_totals(bookings)),
        daily: daily_buckets(bookings),
        weekly: weekday_buckets(bookings),
    }
}

// =============================================================================
//  CUPONS
// =============================================================================

/// Com filtro: só registros com aquele `cupon_name` exato, e sem comparação
/// "sem cupom". Sem filtro: todo registro com `has_coupon()`.
pub fn build_coupon_report(
    period: ReportPeriod,
    bookings: &[Booking],
    coupon_filter: Option<&str>,
    all_coupons: Vec<Coupon>,
    existing_before: &HashSet<ClientKey>,
) -> CouponReport {
    let live: Vec<&Booking> = bookings.iter().filter(|b| !b.is_canceled()).collect();
    let with_coupon: Vec<&Booking> = live
        .iter()
        .copied()
        .filter(|b| match coupon_filter {
            Some(name) => b.cupon_name.as_deref() == Some(name),
            None => b.has_coupon(),
        })
        .collect();

    let active_coupon = match coupon_filter {
        Some(name) => all_coupons.iter().find(|c| c.cupon_name == name).cloned(),
        None => all_coupons.iter().find(|c| c.is_working()).cloned(),
    };

    let split = coupon_split(with_coupon.iter().copied());
    let revenue_with = total_revenue(with_coupon.iter().copied());
    let orders_with = with_coupon.len() as u32;
    let discount: Decimal = with_coupon.iter().map(|b| b.discount()).sum();
    let items_with = total_units(with_coupon.iter().copied());

    let (total_rev, total_ord, orders_without, revenue_without) = if coupon_filter.is_some() {
        (Decimal::ZERO, 0, 0, Decimal::ZERO)
    } else {
        let all_rev = total_revenue(live.iter().copied());
        (
            all_rev,
            live.len() as u32,
            live.len() as u32 - orders_with,
            all_rev - revenue_with,
        )
    };

    let customers = client_segments(with_coupon.iter().copied(), existing_before);
    let products = product_table(with_coupon.iter().copied());
    let top_products = products.products.iter().take(TOP_PRODUCTS).cloned().collect();
    let weekly = weekday_buckets(with_coupon.iter().copied());

    CouponReport {
        period: period.into(),
        selected_coupon_name: coupon_filter.map(str::to_string),
        discount_percent: active_coupon.as_ref().map_or(0, |c| c.discount_percent),
        active_coupon,

        total_revenue_with_coupon: revenue_with,
        orders_with_coupon: orders_with,
        total_discount_amount: discount,
        original_revenue_with_coupon: revenue_with + discount,
        average_order_value_with_coupon: average(revenue_with, orders_with),
        average_order_value_without_coupon: average(revenue_without, orders_without),

        total_revenue: total_rev,
        total_orders: total_ord,
        orders_without_coupon: orders_without,
        revenue_without_coupon: revenue_without,
        coupon_share_of_sales: percentage(revenue_with, total_rev),

        average_revenue_per_client: average(revenue_with, customers.unique),
        registered_percentage: percentage(
            Decimal::from(customers.registered),
            Decimal::from(customers.unique),
        ),
        customers,
        clients: rank_clients(client_totals(with_coupon.iter().copied())),

        top_products,
        products,
        total_items_with_coupon: items_with,
        average_discount_per_item: average(split.total_discount, items_with),

        daily: daily_buckets(with_coupon.iter().copied()),
        peak_weekday: peak_weekday(&weekly),
        weekly,

        all_coupons,
    }
}

// =============================================================================
//  DIRETÓRIO DE CLIENTES
// =============================================================================

struct KeyAcc<'a> {
    first: &'a Booking,
    total: Decimal,
    orders: u32,
    user: Option<&'a RegisteredUser>,
}

fn registered_entry(user: &RegisteredUser, fallback_name: &str, fallback_phone: &str) -> DirectoryEntry {
    let phone = user
        .number
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| fallback_phone.to_string());
    DirectoryEntry {
        name: user.name.clone().unwrap_or_else(|| fallback_name.to_string()),
        phone: phone.clone(),
        display_name: user
            .display_name()
            .unwrap_or_else(|| fallback_name.to_string()),
        total: Decimal::ZERO,
        order_count: 0,
        is_registered: true,
        user_id: Some(user.id),
        first_name: user.name.clone(),
        last_name: user.last_name.clone(),
        middle_name: user.middle_name.clone(),
        username: user.username.clone(),
        phone_number: phone,
        registration_date: Some(user.created_at),
    }
}

fn matches_search(entry: &DirectoryEntry, needle: &str) -> bool {
    [&entry.display_name, &entry.name, &entry.phone, &entry.phone_number]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Diretório de todo o histórico. Um cliente (nome, telefone) ligado a um
/// usuário cadastrado, pelo `cabinet_id` ou pelo telefone do perfil, é fundido
/// nele; usuário sem registros aparece com total 0.
/// Contagens são calculadas antes do filtro e da busca.
pub fn build_client_directory(
    bookings: &[Booking],
    users: &[RegisteredUser],
    filter: DirectoryFilter,
    query: Option<&str>,
) -> ClientDirectory {
    let users_by_id: HashMap<Uuid, &RegisteredUser> = users.iter().map(|u| (u.id, u)).collect();

    // 1) agrupa por (nome, telefone)
    let mut index: HashMap<ClientKey, usize> = HashMap::new();
    let mut keys: Vec<KeyAcc> = Vec::new();
    for b in bookings.iter().filter(|b| !b.is_canceled()) {
        let i = *index.entry(b.client_key()).or_insert_with(|| {
            keys.push(KeyAcc {
                first: b,
                total: Decimal::ZERO,
                orders: 0,
                user: None,
            });
            keys.len() - 1
        });
        let acc = &mut keys[i];
        acc.total += b.total;
        acc.orders += 1;
        if acc.user.is_none() {
            acc.user = b.cabinet_id.and_then(|id| users_by_id.get(&id).copied());
        }
    }

    // 1b) chave sem cabinet_id cujo telefone é o de um cadastro pertence a ele
    let mut users_by_phone: HashMap<&str, &RegisteredUser> = HashMap::new();
    for user in users {
        if let Some(number) = user.number.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            users_by_phone.entry(number).or_insert(user);
        }
    }
    for acc in keys.iter_mut().filter(|acc| acc.user.is_none()) {
        acc.user = users_by_phone.get(acc.first.phone.trim()).copied();
    }

    // 2) funde as chaves que apontam para o mesmo usuário
    let mut entries: Vec<DirectoryEntry> = Vec::new();
    let mut by_user: HashMap<Uuid, usize> = HashMap::new();
    for acc in keys {
        match acc.user {
            Some(user) => {
                let i = *by_user.entry(user.id).or_insert_with(|| {
                    entries.push(registered_entry(user, &acc.first.name, &acc.first.phone));
                    entries.len() - 1
                });
                entries[i].total += acc.total;
                entries[i].order_count += acc.orders;
            }
            None => entries.push(DirectoryEntry {
                name: acc.first.name.clone(),
                phone: acc.first.phone.clone(),
                display_name: acc.first.name.clone(),
                total: acc.total,
                order_count: acc.orders,
                is_registered: false,
                user_id: None,
                first_name: None,
                last_name: None,
                middle_name: None,
                username: None,
                phone_number: acc.first.phone.clone(),
                registration_date: None,
            }),
        }
    }

    // 3) cadastrados sem nenhum registro
    for user in users {
        if !by_user.contains_key(&user.id) {
            by_user.insert(user.id, entries.len());
            entries.push(registered_entry(user, "", ""));
        }
    }

    entries.sort_by(|a, b| b.total.cmp(&a.total));

    let registered = entries.iter().filter(|e| e.is_registered).count() as u32;
    let total = entries.len() as u32;

    let needle = query
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());
    let clients = entries
        .into_iter()
        .filter(|e| match filter {
            DirectoryFilter::All => true,
            DirectoryFilter::Registered => e.is_registered,
            DirectoryFilter::Unregistered => !e.is_registered,
        })
        .filter(|e| needle.as_deref().is_none_or(|n| matches_search(e, n)))
        .collect();

    ClientDirectory {
        total,
        registered,
        unregistered: total - registered,
        clients,
    }
}

/// Histórico sem cancelados, sem ids repetidos, do mais recente ao mais antigo.
pub fn booking_history(bookings: &[Booking]) -> Vec<BookingDetail> {
    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut history: Vec<&Booking> = bookings
        .iter()
        .filter(|b| !b.is_canceled())
        .filter(|b| seen.insert(b.id))
        .collect();
    history.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.time_key().cmp(a.time_key())));
    history.into_iter().map(BookingDetail::from).collect()
}
