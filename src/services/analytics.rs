// src/services/analytics.rs

//! Dobras de uma passada sobre registros já normalizados.
//!
//! Cada função é independente: recebe qualquer coleção de `&Booking`,
//! ignora os cancelados e devolve um bloco pronto para serialização.
//! Nenhuma delas toca o banco.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Weekday};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    analytics::{
        ClientSegments, ClientTotal, CouponSplit, DailyBucket, ProductStat, ProductTable,
        WeekdayBucket,
    },
    booking::{Booking, ClientKey},
};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

// ---
// Helpers numéricos
// ---

/// part / whole * 100, arredondado em 2 casas; 0 quando o denominador é 0.
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part / whole * HUNDRED).round_dp(2)
}

/// sum / count arredondado em 2 casas; 0 quando count é 0.
pub fn average(sum: Decimal, count: u32) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    (sum / Decimal::from(count)).round_dp(2)
}

/// Crescimento da receita contra o período anterior.
///
/// Heurística de exibição, não uma taxa real: anterior 0 e atual positivo
/// vira +100%; ambos 0 vira 0%.
pub fn revenue_growth(current: Decimal, previous: Decimal) -> Decimal {
    if previous > Decimal::ZERO {
        percentage(current - previous, previous)
    } else if current > Decimal::ZERO {
        HUNDRED
    } else {
        Decimal::ZERO
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn live<'a>(bookings: impl IntoIterator<Item = &'a Booking>) -> impl Iterator<Item = &'a Booking> {
    bookings.into_iter().filter(|b| !b.is_canceled())
}

// ---
// Totais simples
// ---

pub fn total_revenue<'a>(bookings: impl IntoIterator<Item = &'a Booking>) -> Decimal {
    live(bookings).map(|b| b.total).sum()
}

pub fn total_units<'a>(bookings: impl IntoIterator<Item = &'a Booking>) -> u32 {
    live(bookings).map(|b| b.units()).sum()
}

pub fn order_count<'a>(bookings: impl IntoIterator<Item = &'a Booking>) -> u32 {
    live(bookings).count() as u32
}

// ---
// Por cliente
// ---

/// Agrupa por (nome, telefone) na ordem de aparição.
/// A soma não depende da ordem de entrada.
pub fn client_totals<'a>(bookings: impl IntoIterator<Item = &'a Booking>) -> Vec<ClientTotal> {
    let mut index: HashMap<ClientKey, usize> = HashMap::new();
    let mut out: Vec<ClientTotal> = Vec::new();

    for b in live(bookings) {
        let i = *index.entry(b.client_key()).or_insert_with(|| {
            out.push(ClientTotal {
                name: b.name.clone(),
                phone: b.phone.clone(),
                total: Decimal::ZERO,
                order_count: 0,
                units: 0,
                is_registered: false,
            });
            out.len() - 1
        });

        let entry = &mut out[i];
        entry.total += b.total;
        entry.order_count += 1;
        entry.units += b.units();
        entry.is_registered |= b.is_registered();
    }

    out
}

/// Ranking por valor pago (decrescente, estável).
pub fn rank_clients(mut clients: Vec<ClientTotal>) -> Vec<ClientTotal> {
    clients.sort_by(|a, b| b.total.cmp(&a.total));
    clients
}

/// Segmentação: únicos, novos, recorrentes, cadastrados e convidados.
///
/// `existing_before` são os clientes com algum registro antes do início do período.
pub fn client_segments<'a>(
    bookings: impl IntoIterator<Item = &'a Booking>,
    existing_before: &HashSet<ClientKey>,
) -> ClientSegments {
    let mut per_client: HashMap<ClientKey, (u32, bool)> = HashMap::new();
    for b in live(bookings) {
        let entry = per_client.entry(b.client_key()).or_insert((0, false));
        entry.0 += 1;
        entry.1 |= b.is_registered();
    }

    let mut seg = ClientSegments {
        unique: per_client.len() as u32,
        ..Default::default()
    };
    for (key, (orders, registered)) in &per_client {
        if !existing_before.contains(key) {
            seg.new += 1;
        }
        if *orders >= 2 {
            seg.repeat += 1;
        }
        if *registered {
            seg.registered += 1;
        } else {
            seg.guest += 1;
        }
    }
    seg
}

// ---
// Por produto
// ---

struct ProductAcc {
    name: String,
    count: u32,
    revenue: Decimal,
    orders: HashSet<Uuid>,
    with_coupon: u32,
    without_coupon: u32,
}

pub fn product_table<'a>(bookings: impl IntoIterator<Item = &'a Booking>) -> ProductTable {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut acc: Vec<ProductAcc> = Vec::new();
    let mut total_sold: u32 = 0;
    let mut revenue: Decimal = Decimal::ZERO;

    for b in live(bookings) {
        revenue += b.total;
        let has_coupon = b.has_coupon();
        for service in &b.services {
            let i = *index.entry(service.name.clone()).or_insert_with(|| {
                acc.push(ProductAcc {
                    name: service.name.clone(),
                    count: 0,
                    revenue: Decimal::ZERO,
                    orders: HashSet::new(),
                    with_coupon: 0,
                    without_coupon: 0,
                });
                acc.len() - 1
            });

            let p = &mut acc[i];
            p.count += 1;
            p.revenue += service.price;
            p.orders.insert(b.id);
            if has_coupon {
                p.with_coupon += 1;
            } else {
                p.without_coupon += 1;
            }
            total_sold += 1;
        }
    }

    let products: Vec<ProductStat> = acc
        .into_iter()
        .map(|p| ProductStat {
            share: percentage(Decimal::from(p.count), Decimal::from(total_sold)),
            revenue_share: percentage(p.revenue, revenue),
            average_price: average(p.revenue, p.count),
            orders: p.orders.len() as u32,
            name: p.name,
            count: p.count,
            revenue: p.revenue,
            with_coupon: p.with_coupon,
            without_coupon: p.without_coupon,
        })
        .collect();

    // Empates ficam com o primeiro que apareceu
    let mut most: Option<&ProductStat> = None;
    let mut least: Option<&ProductStat> = None;
    for p in &products {
        if most.is_none_or(|m| p.count > m.count) {
            most = Some(p);
        }
        if least.is_none_or(|l| p.count < l.count) {
            least = Some(p);
        }
    }
    let most_popular = most.cloned();
    let least_popular = least.cloned();

    let mut sorted = products;
    sorted.sort_by(|a, b| b.count.cmp(&a.count));

    ProductTable {
        products: sorted,
        total_products_sold: total_sold,
        most_popular,
        least_popular,
    }
}

// ---
// Cupons
// ---

/// Divide pedidos entre "com cupom" e "sem cupom" usando `Booking::has_coupon`.
pub fn coupon_split<'a>(bookings: impl IntoIterator<Item = &'a Booking>) -> CouponSplit {
    let mut split = CouponSplit::default();
    for b in live(bookings) {
        if b.has_coupon() {
            split.orders_with_coupon += 1;
            split.revenue_with_coupon += b.total;
            split.units_with_coupon += b.units();
            split.total_discount += b.discount();
            split.original_revenue_with_coupon += b.original_total();
        } else {
            split.orders_without_coupon += 1;
            split.revenue_without_coupon += b.total;
            split.units_without_coupon += b.units();
        }
    }
    split
}

// ---
// Séries temporais
// ---

/// Um balde por data, em ordem crescente.
pub fn daily_buckets<'a>(bookings: impl IntoIterator<Item = &'a Booking>) -> Vec<DailyBucket> {
    let mut days: BTreeMap<chrono::NaiveDate, DailyBucket> = BTreeMap::new();
    for b in live(bookings) {
        let day = days.entry(b.date).or_insert_with(|| DailyBucket {
            date: b.date,
            orders: 0,
            revenue: Decimal::ZERO,
            discount: Decimal::ZERO,
        });
        day.orders += 1;
        day.revenue += b.total;
        day.discount += b.discount();
    }
    days.into_values().collect()
}

/// Um balde por dia da semana presente, segunda primeiro.
pub fn weekday_buckets<'a>(bookings: impl IntoIterator<Item = &'a Booking>) -> Vec<WeekdayBucket> {
    let mut slots: [Option<WeekdayBucket>; 7] = Default::default();
    for b in live(bookings) {
        let weekday = b.date.weekday();
        let idx = weekday.num_days_from_monday();
        let slot = slots[idx as usize].get_or_insert_with(|| WeekdayBucket {
            weekday_index: idx,
            weekday: weekday_name(weekday).to_string(),
            orders: 0,
            revenue: Decimal::ZERO,
        });
        slot.orders += 1;
        slot.revenue += b.total;
    }
    slots.into_iter().flatten().collect()
}

/// Dia da semana com mais pedidos; empate fica com o primeiro (segunda primeiro).
pub fn peak_weekday(buckets: &[WeekdayBucket]) -> Option<WeekdayBucket> {
    let mut best: Option<&WeekdayBucket> = None;
    for day in buckets {
        if best.is_none_or(|b| day.orders > b.orders) {
            best = Some(day);
        }
    }
    best.cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::{fixtures::booking, BookingStatus};

    fn d(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn growth_rules() {
        assert_eq!(revenue_growth(d(0), d(0)), d(0));
        assert_eq!(revenue_growth(d(500), d(0)), d(100));
        assert_eq!(revenue_growth(d(1500), d(1000)), d(50));
        assert_eq!(revenue_growth(d(500), d(1000)), d(-50));
        assert_eq!(revenue_growth(d(0), d(1000)), d(-100));
    }

    #[test]
    fn percentage_and_average_guard_zero() {
        assert_eq!(percentage(d(1), d(0)), d(0));
        assert_eq!(percentage(d(1), d(3)), Decimal::new(3333, 2));
        assert_eq!(average(d(10), 0), d(0));
        assert_eq!(average(d(10), 4), Decimal::new(250, 2));
    }

    #[test]
    fn repeat_client_totals() {
        let bookings = vec![
            booking("Ivan", "+7900", "2025-03-03", 500, &[("Cleaning", 500)]),
            booking("Anna", "+7911", "2025-03-04", 300, &[("X-ray", 300)]),
            booking("Ivan", "+7900", "2025-03-10", 700, &[("Filling", 700)]),
        ];
        let totals = client_totals(&bookings);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].name, "Ivan");
        assert_eq!(totals[0].total, d(1200));
        assert_eq!(totals[0].order_count, 2);

        let seg = client_segments(&bookings, &HashSet::new());
        assert_eq!(seg.unique, 2);
        assert_eq!(seg.repeat, 1);
        assert_eq!(seg.new, 2);
    }

    #[test]
    fn client_totals_do_not_depend_on_order() {
        let mut bookings = vec![
            booking("Ivan", "+7900", "2025-03-03", 500, &[]),
            booking("Anna", "+7911", "2025-03-04", 300, &[]),
            booking("Ivan", "+7900", "2025-03-10", 700, &[]),
            booking("Anna", "+7911", "2025-03-12", 100, &[]),
        ];
        let sorted = |mut v: Vec<ClientTotal>| {
            v.sort_by(|a, b| a.name.cmp(&b.name));
            v
        };
        let forward = sorted(client_totals(&bookings));
        bookings.reverse();
        let backward = sorted(client_totals(&bookings));
        assert_eq!(forward, backward);
    }

    #[test]
    fn same_name_different_phone_are_different_clients() {
        let bookings = vec![
            booking("Ivan", "+7900", "2025-03-03", 500, &[]),
            booking("Ivan", "+7901", "2025-03-03", 500, &[]),
            booking("ivan", "+7900", "2025-03-03", 500, &[]),
        ];
        assert_eq!(client_totals(&bookings).len(), 3);
    }

    #[test]
    fn canceled_bookings_are_ignored_everywhere() {
        let mut canceled = booking("Ghost", "+7000", "2025-03-05", 9999, &[("Implant", 9999)]);
        canceled.status = BookingStatus::Canceled;
        let bookings = vec![booking("Ivan", "+7900", "2025-03-03", 500, &[("Cleaning", 500)]), canceled];

        assert_eq!(total_revenue(&bookings), d(500));
        assert_eq!(order_count(&bookings), 1);
        assert_eq!(client_totals(&bookings).len(), 1);
        assert_eq!(product_table(&bookings).total_products_sold, 1);
        assert_eq!(daily_buckets(&bookings).len(), 1);
        assert_eq!(coupon_split(&bookings).orders_without_coupon, 1);
    }

    #[test]
    fn new_clients_exclude_those_seen_before_the_period() {
        let bookings = vec![
            booking("Ivan", "+7900", "2025-03-03", 500, &[]),
            booking("Anna", "+7911", "2025-03-04", 300, &[]),
        ];
        let mut before = HashSet::new();
        before.insert(ClientKey::new("Ivan", "+7900"));
        let seg = client_segments(&bookings, &before);
        assert_eq!(seg.new, 1);
        assert_eq!(seg.repeat, 0);
    }

    #[test]
    fn registered_if_any_booking_has_a_reference() {
        let first = booking("Ivan", "+7900", "2025-03-03", 500, &[]);
        let mut second = booking("Ivan", "+7900", "2025-03-04", 500, &[]);
        second.cabinet_id = Some(Uuid::new_v4());
        let bookings = vec![first, second, booking("Anna", "+7911", "2025-03-04", 300, &[])];

        let seg = client_segments(&bookings, &HashSet::new());
        assert_eq!(seg.registered, 1);
        assert_eq!(seg.guest, 1);
        assert!(client_totals(&bookings)[0].is_registered);
    }

    #[test]
    fn product_popularity_with_stable_ties() {
        let bookings = vec![
            booking("A", "1", "2025-03-03", 1500, &[("Cleaning", 1000), ("X-ray", 500)]),
            booking("B", "2", "2025-03-04", 800, &[("Cleaning", 1000)]),
            booking("C", "3", "2025-03-05", 300, &[("Consult", 300)]),
        ];
        let table = product_table(&bookings);

        assert_eq!(table.total_products_sold, 4);
        assert_eq!(table.products[0].name, "Cleaning");
        assert_eq!(table.products[0].count, 2);
        assert_eq!(table.products[0].orders, 2);
        assert_eq!(table.products[0].revenue, d(2000));
        assert_eq!(table.products[0].with_coupon, 1);
        assert_eq!(table.products[0].share, d(50));
        assert_eq!(table.products[0].average_price, d(1000));

        assert_eq!(table.most_popular.unwrap().name, "Cleaning");
        // X-ray e Consult empatam com 1: vence quem apareceu primeiro
        assert_eq!(table.least_popular.unwrap().name, "X-ray");
        assert_eq!(table.products[1].name, "X-ray");
    }

    #[test]
    fn product_table_of_nothing_is_empty() {
        let table = product_table(&Vec::<Booking>::new());
        assert!(table.products.is_empty());
        assert!(table.most_popular.is_none());
        assert!(table.least_popular.is_none());
    }

    #[test]
    fn coupon_split_uses_the_canonical_signal() {
        let discounted = booking("A", "1", "2025-03-03", 800, &[("Cleaning", 1000)]);
        let mut named = booking("B", "2", "2025-03-03", 1000, &[("Cleaning", 1000)]);
        named.cupon_name = Some("SPRING".into());
        let plain = booking("C", "3", "2025-03-03", 1000, &[("Cleaning", 1000)]);

        let split = coupon_split(&vec![discounted, named, plain]);
        assert_eq!(split.orders_with_coupon, 2);
        assert_eq!(split.orders_without_coupon, 1);
        assert_eq!(split.revenue_with_coupon, d(1800));
        assert_eq!(split.total_discount, d(200));
        assert_eq!(split.original_revenue_with_coupon, d(2000));
        assert_eq!(split.units_without_coupon, 1);
    }

    #[test]
    fn weekday_buckets_are_monday_first() {
        // 2025-03-02 é domingo, 2025-03-03 segunda, 2025-03-05 quarta
        let bookings = vec![
            booking("A", "1", "2025-03-02", 100, &[]),
            booking("B", "2", "2025-03-05", 200, &[]),
            booking("C", "3", "2025-03-03", 300, &[]),
            booking("D", "4", "2025-03-09", 400, &[]),
        ];
        let weekly = weekday_buckets(&bookings);
        let names: Vec<&str> = weekly.iter().map(|w| w.weekday.as_str()).collect();
        assert_eq!(names, vec!["Monday", "Wednesday", "Sunday"]);
        assert_eq!(weekly[2].orders, 2);
        assert_eq!(weekly[2].revenue, d(500));
        assert_eq!(weekly[2].weekday_index, 6);

        assert_eq!(peak_weekday(&weekly).unwrap().weekday, "Sunday");
    }

    #[test]
    fn peak_weekday_ties_go_to_the_earlier_day() {
        let bookings = vec![
            booking("A", "1", "2025-03-05", 100, &[]),
            booking("B", "2", "2025-03-03", 100, &[]),
        ];
        let weekly = weekday_buckets(&bookings);
        assert_eq!(peak_weekday(&weekly).unwrap().weekday, "Monday");
        assert!(peak_weekday(&[]).is_none());
    }

    #[test]
    fn daily_buckets_are_sorted_by_date() {
        let bookings = vec![
            booking("A", "1", "2025-03-10", 800, &[("Cleaning", 1000)]),
            booking("B", "2", "2025-03-01", 100, &[]),
            booking("C", "3", "2025-03-10", 100, &[]),
        ];
        let daily = daily_buckets(&bookings);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date.to_string(), "2025-03-01");
        assert_eq!(daily[1].orders, 2);
        assert_eq!(daily[1].revenue, d(900));
        assert_eq!(daily[1].discount, d(200));
    }
}
