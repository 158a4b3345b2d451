use crate::models::holding::{Holding, Metal};
use crate::models::portfolio::Portfolio;
use crate::models::quote::SpotQuote;
use crate::models::valuation::{
    DashboardView, HoldingValuation, HoldingsView, MetalGroup, ValuationSummary,
};

/// Melt value and profit/loss of the portfolio at a spot quote.
///
/// Pure: no I/O, no cached state. Everything is recomputed from the
/// holdings on each call.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, portfolio: &Portfolio, quote: &SpotQuote) -> ValuationSummary {
        let total_silver_ozt = total_ozt(portfolio.holdings(Metal::Silver));
        let total_gold_ozt = total_ozt(portfolio.holdings(Metal::Gold));

        let silver_melt_value = total_silver_ozt * quote.silver;
        let gold_melt_value = total_gold_ozt * quote.gold;
        let total_melt_value = silver_melt_value + gold_melt_value;

        let total_cost: f64 = portfolio.iter().map(Holding::total_cost).sum();
        let profit_loss = total_melt_value - total_cost;
        let profit_loss_percent = if total_cost > 0.0 {
            (profit_loss / total_cost) * 100.0
        } else {
            0.0
        };

        ValuationSummary {
            total_silver_ozt,
            total_gold_ozt,
            silver_melt_value,
            gold_melt_value,
            total_melt_value,
            total_cost,
            profit_loss,
            profit_loss_percent,
        }
    }

    pub fn value_holding(&self, holding: &Holding, quote: &SpotQuote) -> HoldingValuation {
        HoldingValuation {
            holding: holding.clone(),
            total_ozt: holding.total_ozt(),
            total_cost: holding.total_cost(),
            melt_value: holding.melt_value(quote.price(holding.metal)),
        }
    }

    /// Up to `limit` holdings of either metal, newest purchase date first.
    /// Holdings bought on the same day keep their stored order.
    pub fn recent_holdings(
        &self,
        portfolio: &Portfolio,
        quote: &SpotQuote,
        limit: usize,
    ) -> Vec<HoldingValuation> {
        let mut holdings: Vec<&Holding> = portfolio.iter().collect();
        holdings.sort_by(|a, b| b.date.cmp(&a.date));
        holdings
            .into_iter()
            .take(limit)
            .map(|h| self.value_holding(h, quote))
            .collect()
    }

    pub fn holdings_view(&self, portfolio: &Portfolio, quote: &SpotQuote) -> HoldingsView {
        let groups = Metal::ALL
            .into_iter()
            .map(|metal| MetalGroup {
                metal,
                spot: quote.price(metal),
                holdings: portfolio
                    .holdings(metal)
                    .iter()
                    .map(|h| self.value_holding(h, quote))
                    .collect(),
            })
            .collect();
        HoldingsView { groups }
    }

    pub fn dashboard(
        &self,
        portfolio: &Portfolio,
        quote: &SpotQuote,
        recent_limit: usize,
    ) -> DashboardView {
        DashboardView {
            quote: quote.clone(),
            silver_change: quote.change.silver,
            gold_change: quote.change.gold,
            summary: self.summarize(portfolio, quote),
            recent: self.recent_holdings(portfolio, quote, recent_limit),
            holdings_count: portfolio.len(),
        }
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}

fn total_ozt(holdings: &[Holding]) -> f64 {
    holdings.iter().map(Holding::total_ozt).sum()
}
